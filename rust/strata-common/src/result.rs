pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Fails with an `InvalidArgument` error when the condition does not hold.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

/// Checks a positional field index dispatched by the driver against the number of
/// fields in the group.
#[inline]
pub fn verify_field_index(index: usize, field_count: usize) -> Result<()> {
    if index < field_count {
        Ok(())
    } else {
        invalid_field_index(index, field_count)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cold]
fn invalid_field_index(index: usize, field_count: usize) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: "field_index".to_string(),
        message: format!("illegal field index {index} (group has {field_count} fields)"),
    }
    .into())
}
