pub mod connectivity;

pub use connectivity::{ConnectivityProbe, ConnectivityStatus};
