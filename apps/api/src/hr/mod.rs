// HR review: dashboard aggregates, shortlist/reject actions and raw history access.

pub mod handlers;
