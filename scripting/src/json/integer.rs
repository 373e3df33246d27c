use std::any::Any;

use serde_json::Value;

use super::{ParseHelper, ParsedData};
use crate::error::{Error, Result};

/// Every value found under an `"integer"` key, in document order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IntegerData {
    values: Vec<i32>,
}

impl IntegerData {
    #[inline]
    pub fn values(&self) -> &[i32] {
        &self.values
    }
}

impl ParsedData for IntegerData {
    fn initialize(&mut self) {
        self.values.clear();
    }

    fn create(&self) -> Self {
        Self::default()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Collects `"integer"` members, scalar or array, into [`IntegerData`].
#[derive(Debug, Default)]
pub struct IntegerParseHelper {
    open: usize,
    starts: usize,
    ends: usize,
}

impl IntegerParseHelper {
    pub const KEY: &'static str = "integer";

    pub fn new() -> Self {
        Self::default()
    }

    /// Members accepted during the last parse.
    #[inline]
    pub fn starts(&self) -> usize {
        self.starts
    }

    /// Members finished during the last parse.
    #[inline]
    pub fn ends(&self) -> usize {
        self.ends
    }
}

impl ParseHelper for IntegerParseHelper {
    fn initialize(&mut self) {
        *self = Self::default();
    }

    fn create(&self) -> Box<dyn ParseHelper> {
        Box::new(Self::new())
    }

    fn start(&mut self, data: &mut dyn ParsedData, key: &str, value: &Value) -> Result<bool> {
        let Some(data) = data.downcast_mut::<IntegerData>() else {
            return Ok(false);
        };
        if key != Self::KEY {
            return Ok(false);
        }

        match value {
            Value::Array(_) => {}
            Value::Number(number) => {
                let integer = number
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(|| Error::UnexpectedJson(format!("{number} is not an i32")))?;
                data.values.push(integer);
            }
            other => {
                return Err(Error::UnexpectedJson(format!(
                    "expected an integer, found {other}"
                )));
            }
        }
        self.open += 1;
        self.starts += 1;
        Ok(true)
    }

    fn end(&mut self, _data: &mut dyn ParsedData, key: &str) -> Result<()> {
        if key != Self::KEY || self.open == 0 {
            return Err(Error::UnexpectedJson(format!("unbalanced end for {key:?}")));
        }
        self.open -= 1;
        self.ends += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
