mod anomaly;
mod common;
