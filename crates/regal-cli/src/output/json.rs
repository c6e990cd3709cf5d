use regal_core::error::RegalError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), RegalError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
