//! Parsing of raw UI input into typed cart commands.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown cart action `{0}`")]
    UnknownAction(String),

    #[error("`{0}` is not a valid product id")]
    InvalidProductId(String),

    #[error("`{0}` is not a whole number")]
    InvalidQuantity(String),

    #[error("quantity must be at least 1")]
    NonPositiveQuantity,

    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// A user intent against the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartCommand {
    Add { product_id: Uuid, quantity: u32 },
    Increment(Uuid),
    Decrement(Uuid),
    Remove(Uuid),
    Clear,
}

impl CartCommand {
    /// Builds a command from the action name, product id and optional
    /// quantity text as they arrive from the UI.
    pub fn parse(
        action: &str,
        product_id: Option<&str>,
        quantity: Option<&str>,
    ) -> Result<Self, InputError> {
        let action = action.trim().to_ascii_lowercase();
        if action == "clear" {
            return Ok(CartCommand::Clear);
        }

        let id = || parse_product_id(product_id.ok_or(InputError::Missing("product_id"))?);
        match action.as_str() {
            "add" => Ok(CartCommand::Add {
                product_id: id()?,
                quantity: quantity.map(parse_quantity).transpose()?.unwrap_or(1),
            }),
            "increment" | "inc" | "plus" => Ok(CartCommand::Increment(id()?)),
            "decrement" | "dec" | "minus" => Ok(CartCommand::Decrement(id()?)),
            "remove" | "rm" => Ok(CartCommand::Remove(id()?)),
            _ => Err(InputError::UnknownAction(action)),
        }
    }
}

pub fn parse_product_id(raw: &str) -> Result<Uuid, InputError> {
    Uuid::parse_str(raw.trim()).map_err(|_| InputError::InvalidProductId(raw.to_string()))
}

pub fn parse_quantity(raw: &str) -> Result<u32, InputError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| InputError::InvalidQuantity(raw.to_string()))?;
    if value <= 0 {
        return Err(InputError::NonPositiveQuantity);
    }
    u32::try_from(value).map_err(|_| InputError::InvalidQuantity(raw.to_string()))
}
