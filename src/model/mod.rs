pub mod calendar;
pub mod feature;
pub mod order;

pub use calendar::{CalendarGrid, DateRange, MonthSpan};
pub use feature::{Marker, Owner, ScheduledFeature, StatusBadge, TimelineItem};
pub use order::{LineItem, Order, OrderStatus, StaffMember};
