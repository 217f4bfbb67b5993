pub mod validation;

pub use validation::{
    country_code, currency_code, non_negative, positive, ValidatedJson, ValidatedQuery,
};
