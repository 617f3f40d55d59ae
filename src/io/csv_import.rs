use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{LineItem, Order, OrderStatus, StaffMember};

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Minutes from "90", "90m", "1.5h" or "1:30".
fn parse_minutes(s: &str) -> Option<u32> {
    let s = s.trim().to_lowercase();
    if let Some((h, m)) = s.split_once(':') {
        let hours: u32 = h.trim().parse().ok()?;
        let minutes: u32 = m.trim().parse().ok()?;
        return hours.checked_mul(60)?.checked_add(minutes);
    }
    if let Some(hours) = s.strip_suffix('h') {
        let hours: f64 = hours.trim().parse().ok()?;
        return (hours.is_finite() && hours >= 0.0).then(|| (hours * 60.0).round() as u32);
    }
    s.strip_suffix("min")
        .or_else(|| s.strip_suffix('m'))
        .unwrap_or(&s)
        .trim()
        .parse()
        .ok()
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Reference,
    Customer,
    Status,
    Start,
    Due,
    Item,
    Estimate,
    Assignee,
}

fn header_to_col(normalized: &str) -> Option<Column> {
    match normalized {
        "order" | "orderno" | "ordernumber" | "orderref" | "reference" | "ref" => {
            Some(Column::Reference)
        }
        "customer" | "client" | "customername" | "name" => Some(Column::Customer),
        "status" | "state" | "stage" => Some(Column::Status),
        "start" | "startdate" | "begin" | "from" => Some(Column::Start),
        "due" | "duedate" | "deadline" | "end" | "enddate" | "pickup" => Some(Column::Due),
        "item" | "lineitem" | "task" | "work" | "service" | "garment" | "description" => {
            Some(Column::Item)
        }
        "estimate" | "minutes" | "estimatedminutes" | "duration" | "time" => {
            Some(Column::Estimate)
        }
        "assignee" | "assignedto" | "staff" | "tailor" | "owner" => Some(Column::Assignee),
        _ => None,
    }
}

#[derive(Default)]
struct Row {
    reference: String,
    customer: String,
    status: String,
    start: String,
    due: String,
    item: String,
    estimate: String,
    assignee: String,
}

impl Row {
    fn set(&mut self, column: Column, value: &str) {
        let slot = match column {
            Column::Reference => &mut self.reference,
            Column::Customer => &mut self.customer,
            Column::Status => &mut self.status,
            Column::Start => &mut self.start,
            Column::Due => &mut self.due,
            Column::Item => &mut self.item,
            Column::Estimate => &mut self.estimate,
            Column::Assignee => &mut self.assignee,
        };
        *slot = value.trim().to_string();
    }
}

fn optional_date(raw: &str) -> std::result::Result<Option<NaiveDate>, ()> {
    if raw.is_empty() {
        Ok(None)
    } else {
        parse_date(raw).map(Some).ok_or(())
    }
}

/// Import orders from a CSV of order lines, one line item per row.
///
/// Auto-detects the delimiter and matches headers loosely ("Order No",
/// "Due Date", "Assigned To", ...). Rows that share an order reference are
/// merged into one order; the first row of an order decides its customer,
/// status and dates. Assignees are matched to the roster by name.
/// Returns `(orders, skipped_rows)`.
pub fn import_orders(path: &Path, roster: &[StaffMember]) -> Result<(Vec<Order>, usize)> {
    let content = std::fs::read_to_string(path)?;
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let col_map: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_col(&normalize_header(h)))
        .collect();

    let has = |column: Column| col_map.contains(&Some(column));
    if !has(Column::Reference) || !has(Column::Item) || !has(Column::Due) {
        return Err(Error::MissingColumns {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    let staff_by_name: HashMap<String, uuid::Uuid> = roster
        .iter()
        .map(|staff| (staff.name.trim().to_lowercase(), staff.id))
        .collect();

    let mut orders: Vec<Order> = Vec::new();
    let mut index_by_reference: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };

        let mut row = Row::default();
        for (field, column) in record.iter().zip(&col_map) {
            if let Some(column) = column {
                row.set(*column, field);
            }
        }

        if row.reference.is_empty() || row.item.is_empty() {
            warn!(line, "skipping row without order reference or item");
            skipped += 1;
            continue;
        }
        let (Ok(start), Ok(due)) = (optional_date(&row.start), optional_date(&row.due)) else {
            warn!(line, start = %row.start, due = %row.due, "skipping row with an invalid date");
            skipped += 1;
            continue;
        };

        let mut item = LineItem::new(row.item);
        if !row.estimate.is_empty() {
            item.estimated_minutes = parse_minutes(&row.estimate);
            if item.estimated_minutes.is_none() {
                warn!(line, estimate = %row.estimate, "unreadable estimate, using the default");
            }
        }
        if !row.assignee.is_empty() {
            item.assignee_id = staff_by_name.get(&row.assignee.to_lowercase()).copied();
            if item.assignee_id.is_none() {
                warn!(line, assignee = %row.assignee, "assignee not on the roster, leaving unassigned");
            }
        }

        let key = row.reference.to_lowercase();
        let index = *index_by_reference.entry(key).or_insert_with(|| {
            let status = if row.status.is_empty() {
                OrderStatus::New
            } else {
                OrderStatus::parse(&row.status).unwrap_or_else(|| {
                    warn!(line, status = %row.status, "unknown status, treating as new");
                    OrderStatus::New
                })
            };
            let mut order = Order::new(row.reference.clone(), row.customer.clone()).with_status(status);
            order.start_date = start;
            order.due_date = due;
            orders.push(order);
            orders.len() - 1
        });
        let order = &mut orders[index];
        if order.due_date.is_none() {
            order.due_date = due;
        }
        if order.start_date.is_none() {
            order.start_date = start;
        }
        order.line_items.push(item);
    }

    if orders.is_empty() {
        return Err(Error::NoRows {
            path: path.to_path_buf(),
            skipped,
        });
    }

    debug!(orders = orders.len(), skipped, "orders imported");
    Ok((orders, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rows_with_the_same_reference_become_one_order() {
        let mara = StaffMember::new("Mara");
        let file = write_csv(
            "Order No;Customer;Status;Due Date;Item;Minutes;Assigned To\n\
             ORD-1;Ada;in progress;15/01/2024;Hem trousers;45;mara\n\
             ORD-2;Bo;new;2024-01-20;Replace zip;1.5h;\n\
             ord-1;Ada;;15/01/2024;Shorten sleeves;1:30;Mara\n",
        );
        let (orders, skipped) = import_orders(file.path(), &[mara.clone()]).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(orders.len(), 2);

        let first = &orders[0];
        assert_eq!(first.reference, "ORD-1");
        assert_eq!(first.status, OrderStatus::InProgress);
        assert_eq!(first.due_date, Some(date(2024, 1, 15)));
        assert_eq!(first.line_items.len(), 2);
        assert_eq!(first.line_items[0].estimated_minutes, Some(45));
        assert_eq!(first.line_items[1].estimated_minutes, Some(90));
        assert!(first.line_items.iter().all(|l| l.assignee_id == Some(mara.id)));

        assert_eq!(orders[1].line_items[0].estimated_minutes, Some(90));
        assert_eq!(orders[1].line_items[0].assignee_id, None);
    }

    #[test]
    fn comma_delimited_files_are_detected() {
        let file = write_csv("reference,item,due\nORD-9,Alter dress,2024-03-01\n");
        let (orders, _) = import_orders(file.path(), &[]).unwrap();
        assert_eq!(orders[0].due_date, Some(date(2024, 3, 1)));
        assert_eq!(orders[0].status, OrderStatus::New);
    }

    #[test]
    fn bad_rows_are_skipped_and_counted() {
        let file = write_csv(
            "ref;item;due\n\
             ORD-1;Hem;not a date\n\
             ;Hem;2024-01-01\n\
             ORD-2;Hem;2024-01-02\n",
        );
        let (orders, skipped) = import_orders(file.path(), &[]).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn missing_columns_are_reported() {
        let file = write_csv("customer;item\nAda;Hem\n");
        match import_orders(file.path(), &[]) {
            Err(Error::MissingColumns { found }) => assert_eq!(found, ["customer", "item"]),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn a_file_of_only_bad_rows_is_an_error() {
        let file = write_csv("ref;item;due\nORD-1;;2024-01-01\n");
        assert!(matches!(
            import_orders(file.path(), &[]),
            Err(Error::NoRows { skipped: 1, .. })
        ));
    }

    #[test]
    fn estimates_accept_several_spellings() {
        assert_eq!(parse_minutes("90"), Some(90));
        assert_eq!(parse_minutes("90m"), Some(90));
        assert_eq!(parse_minutes("20 min"), Some(20));
        assert_eq!(parse_minutes("2h"), Some(120));
        assert_eq!(parse_minutes("0:45"), Some(45));
        assert_eq!(parse_minutes("soon"), None);
    }
}
