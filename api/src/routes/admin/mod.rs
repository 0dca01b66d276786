//! Administrative email routes

pub mod test_email;
