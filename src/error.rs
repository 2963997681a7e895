use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("service points must not be empty")]
    EmptyServicePoints,
    #[error("arrival processes must not be empty")]
    EmptyArrivals,
    #[error("duplicate service point name '{0}'")]
    DuplicatePointName(String),
    #[error("duplicate customer type '{0}'")]
    DuplicateCustomerType(String),
    #[error("route from '{point}' targets unknown service point '{target}'")]
    UnknownRouteTarget { point: String, target: String },
    #[error("route from '{point}' names unknown customer type '{customer_type}'")]
    UnknownRouteType { point: String, customer_type: String },
    #[error("arrival process for '{customer_type}' targets unknown entry point '{entry_point}'")]
    UnknownEntryPoint {
        customer_type: String,
        entry_point: String,
    },
    #[error("mean must be > 0 in '{context}' (got {value})")]
    NonPositiveMean { context: String, value: f64 },
    #[error("variance must be > 0 in '{context}' (got {value})")]
    NonPositiveVariance { context: String, value: f64 },
    #[error("constant duration must be > 0 in '{context}' (got {value})")]
    NonPositiveConstant { context: String, value: f64 },
    #[error("uniform bounds must satisfy 0 <= min < max in '{context}' (got {min}..{max})")]
    InvalidUniformBounds { context: String, min: f64, max: f64 },
    #[error("simulation end time must be > 0 (got {0})")]
    InvalidEndTime(f64),
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("{0}")]
    ReportIo(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
