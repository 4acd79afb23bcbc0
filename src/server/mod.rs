pub mod guards;
pub mod router;
pub mod routes;

pub use router::{HearthState, hearth_router};
