pub mod layout;
pub mod view;

pub use layout::{
    BarRect, DayColumn, FeatureRow, LayoutMetrics, MarkerLine, MonthHeader, TimelineLayout,
};
pub use view::{ContextMenu, TimelineEvent, TimelineView};
