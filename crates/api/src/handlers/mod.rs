pub mod alerts;
pub mod kpis;
pub mod readings;
pub mod stations;
