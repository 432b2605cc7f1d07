pub mod haversine;
pub mod hilbert;
