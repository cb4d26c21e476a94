use chrono::{Datelike, Utc};

use crate::domain::Year;

pub mod apply_year;

/// Season used when a write carries skills but no explicit year.
pub fn current_year() -> Year {
    Utc::now().year()
}
