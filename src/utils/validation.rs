use crate::utils::error::{Result, ServiceError};
use serde_json::Value;
use std::num::IntErrorKind;

pub const PRICE_MIN: i64 = 1;
pub const PRICE_MAX: i64 = 30;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 價格寫入前的檢查，與資料庫的 CHECK 約束並行
///
/// 整數、小數部分為零的浮點數、以及內容為整數的字串都會被轉換；
/// 其餘型別 (布林、陣列、物件) 一律視為非整數；超出 i64 的整數視為超出範圍。
pub fn validate_price(raw: Option<&Value>) -> Result<i64> {
    let price = coerce_integer(raw).map_err(|problem| match problem {
        Coercion::Missing => ServiceError::validation("price must be present"),
        Coercion::NotInteger => ServiceError::validation("price must be an integer"),
        Coercion::OutOfRange => ServiceError::validation("price out of range"),
    })?;

    if !(PRICE_MIN..=PRICE_MAX).contains(&price) {
        return Err(ServiceError::validation("price out of range"));
    }
    Ok(price)
}

/// 外鍵欄位 (pizza_id / restaurant_id) 的存在與型別檢查；是否指向既有資料交給儲存層判斷
pub fn validate_foreign_id(field_name: &str, raw: Option<&Value>) -> Result<i64> {
    coerce_integer(raw).map_err(|problem| match problem {
        Coercion::Missing => ServiceError::validation(format!("{} must be present", field_name)),
        Coercion::NotInteger => {
            ServiceError::validation(format!("{} must be an integer", field_name))
        }
        Coercion::OutOfRange => ServiceError::validation(format!("{} out of range", field_name)),
    })
}

enum Coercion {
    Missing,
    NotInteger,
    /// 是整數，但超出 i64
    OutOfRange,
}

fn coerce_integer(raw: Option<&Value>) -> std::result::Result<i64, Coercion> {
    match raw {
        None | Some(Value::Null) => Err(Coercion::Missing),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_i64() {
                return Ok(v);
            }
            if n.is_u64() {
                return Err(Coercion::OutOfRange);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => {
                    if f.abs() < i64::MAX as f64 {
                        Ok(f as i64)
                    } else {
                        Err(Coercion::OutOfRange)
                    }
                }
                _ => Err(Coercion::NotInteger),
            }
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Coercion::OutOfRange,
            _ => Coercion::NotInteger,
        }),
        Some(_) => Err(Coercion::NotInteger),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ServiceError::MissingConfigError {
        field: field_name.to_string(),
    })
}

/// 實體欄位 (name / address / ingredients) 不可為空白
pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!(
            "{} cannot be empty or whitespace-only",
            field_name
        )));
    }
    Ok(())
}
