use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an order is in the shop's workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    InProgress,
    Fitting,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::New,
        OrderStatus::InProgress,
        OrderStatus::Fitting,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// No more bench work is expected once an order reaches one of these.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Ready | OrderStatus::Delivered | OrderStatus::Cancelled
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::New => "New",
            OrderStatus::InProgress => "In progress",
            OrderStatus::Fitting => "Fitting",
            OrderStatus::Ready => "Ready",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Badge color as RGB.
    pub fn color(self) -> [u8; 3] {
        match self {
            OrderStatus::New => [66, 133, 244],
            OrderStatus::InProgress => [251, 140, 0],
            OrderStatus::Fitting => [171, 71, 188],
            OrderStatus::Ready => [52, 168, 83],
            OrderStatus::Delivered => [120, 124, 140],
            OrderStatus::Cancelled => [229, 57, 53],
        }
    }

    /// Lenient parse of free-text status values.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" | "received" | "open" | "pending" => Some(OrderStatus::New),
            "in progress" | "in-progress" | "in_progress" | "active" | "started" => {
                Some(OrderStatus::InProgress)
            }
            "fitting" | "awaiting fitting" | "fitting booked" => Some(OrderStatus::Fitting),
            "ready" | "done" | "finished" | "complete" | "completed" => Some(OrderStatus::Ready),
            "delivered" | "collected" | "picked up" => Some(OrderStatus::Delivered),
            "cancelled" | "canceled" | "void" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// One unit of assignable bench work inside an order (a hem, a fitting, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    pub label: String,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
}

impl LineItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            estimated_minutes: None,
            assignee_id: None,
        }
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    pub fn assigned_to(mut self, staff: Uuid) -> Self {
        self.assignee_id = Some(staff);
        self
    }
}

/// A customer order as handed over by the order-intake side of the shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Human-facing number, e.g. "ORD-1042".
    pub reference: String,
    pub customer: String,
    pub status: OrderStatus,
    /// When bench work is planned to start.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Order {
    pub fn new(reference: impl Into<String>, customer: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference: reference.into(),
            customer: customer.into(),
            status: OrderStatus::New,
            start_date: None,
            due_date: None,
            line_items: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn starting(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    /// Still on the workbench and schedulable.
    pub fn counts_toward_workload(&self) -> bool {
        !self.status.is_terminal() && self.due_date.is_some()
    }
}

/// A member of staff who can be assigned work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub name: String,
}

impl StaffMember {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
