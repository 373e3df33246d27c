use std::{fs::File, io::Read, path::Path};

use log::warn;
use serde_json::{Map, Value};

use super::{ParseHelper, ParsedData};
use crate::error::{Error, Result};

/// Drives a chain of [`ParseHelper`]s over JSON documents, collecting results in `D`.
pub struct ParseCoordinator<D: ParsedData> {
    data: D,
    helpers: Vec<Box<dyn ParseHelper>>,
    depth: usize,
    is_clone: bool,
}

impl<D: ParsedData> ParseCoordinator<D> {
    pub fn new(data: D) -> Self {
        Self {
            data,
            helpers: Vec::new(),
            depth: 0,
            is_clone: false,
        }
    }

    /// A coordinator with fresh helpers of the same types and a fresh, empty container.
    pub fn clone_fresh(&self) -> Self {
        Self {
            data: self.data.create(),
            helpers: self.helpers.iter().map(|helper| helper.create()).collect(),
            depth: 0,
            is_clone: true,
        }
    }

    /// True for coordinators made by [`clone_fresh`](Self::clone_fresh).
    #[inline]
    pub fn is_clone(&self) -> bool {
        self.is_clone
    }

    /// Append `helper` to the end of the chain.
    pub fn add_helper(&mut self, helper: Box<dyn ParseHelper>) {
        self.helpers.push(helper);
    }

    /// Remove the helper at `index` from the chain.
    pub fn remove_helper(&mut self, index: usize) -> Option<Box<dyn ParseHelper>> {
        (index < self.helpers.len()).then(|| self.helpers.remove(index))
    }

    #[inline]
    pub fn helpers(&self) -> &[Box<dyn ParseHelper>] {
        &self.helpers
    }

    #[inline]
    pub fn data(&self) -> &D {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    pub fn into_data(self) -> D {
        self.data
    }

    /// Object nesting depth of the member being parsed. Zero between parses.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parse_str(&mut self, text: &str) -> Result<()> {
        let root: Value = serde_json::from_str(text)?;
        self.parse_value(&root)
    }

    pub fn parse_reader(&mut self, reader: impl Read) -> Result<()> {
        let root: Value = serde_json::from_reader(reader)?;
        self.parse_value(&root)
    }

    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::open(path)?;
        self.parse_reader(std::io::BufReader::new(file))
    }

    /// Parse an already decoded document. The root must be an object.
    pub fn parse_value(&mut self, root: &Value) -> Result<()> {
        if self.helpers.is_empty() {
            return Ok(());
        }
        let Value::Object(members) = root else {
            return Err(Error::UnexpectedJson(format!(
                "document root must be an object, found {root}"
            )));
        };

        self.data.initialize();
        for helper in &mut self.helpers {
            helper.initialize();
        }

        let result = self.parse_members(members);

        self.depth = 0;
        for helper in &mut self.helpers {
            helper.cleanup();
        }
        self.data.cleanup();
        result
    }

    fn parse_members(&mut self, members: &Map<String, Value>) -> Result<()> {
        self.depth += 1;
        for (key, value) in members {
            self.parse_member(key, value)?;
        }
        self.depth -= 1;
        Ok(())
    }

    fn parse_member(&mut self, key: &str, value: &Value) -> Result<()> {
        for index in 0..self.helpers.len() {
            if !self.helpers[index].start(&mut self.data, key, value)? {
                continue;
            }
            match value {
                Value::Array(elements) => {
                    for element in elements {
                        self.parse_member(key, element)?;
                    }
                }
                Value::Object(members) => self.parse_members(members)?,
                _ => {}
            }
            return self.helpers[index].end(&mut self.data, key);
        }

        warn!("no parse helper handled {key:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::json::{IntegerData, IntegerParseHelper, TableData, TableParseHelper};

    fn integer_coordinator() -> ParseCoordinator<IntegerData> {
        let mut coordinator = ParseCoordinator::new(IntegerData::default());
        coordinator.add_helper(Box::new(IntegerParseHelper::new()));
        coordinator
    }

    #[test]
    fn parses_scalars_and_arrays() {
        // Given
        let mut coordinator = integer_coordinator();

        // When
        coordinator
            .parse_str(r#"{ "integer": [10, 20, 30] }"#)
            .unwrap();

        // Then
        assert_eq!(coordinator.data().values(), &[10, 20, 30]);
        assert_eq!(coordinator.depth(), 0);
    }

    #[test]
    fn unhandled_objects_are_not_descended() {
        // Given
        let mut coordinator = integer_coordinator();

        // When
        coordinator
            .parse_str(r#"{ "integer": 10, "nested": { "integer": [20, 30] } }"#)
            .unwrap();

        // Then
        assert_eq!(coordinator.data().values(), &[10]);
        assert_eq!(coordinator.depth(), 0);
    }

    #[test]
    fn members_without_a_helper_are_skipped() {
        // Given
        let mut coordinator = integer_coordinator();

        // When
        coordinator
            .parse_str(r#"{ "string": "hi", "integer": 5 }"#)
            .unwrap();

        // Then
        assert_eq!(coordinator.data().values(), &[5]);
    }

    #[test]
    fn start_and_end_are_paired() {
        // Given
        let mut coordinator = integer_coordinator();

        // When
        coordinator
            .parse_reader(Cursor::new(r#"{ "integer": [1, 2, 3] }"#))
            .unwrap();

        // Then - the array and each element
        let helper = coordinator.helpers()[0]
            .downcast_ref::<IntegerParseHelper>()
            .unwrap();
        assert_eq!(helper.starts(), 4);
        assert_eq!(helper.ends(), 4);
    }

    #[test]
    fn no_helpers_is_a_no_op() {
        // Given
        let mut coordinator = ParseCoordinator::new(IntegerData::default());

        // Then
        assert!(coordinator.parse_str(r#"{ "integer": 1 }"#).is_ok());
        assert!(coordinator.data().values().is_empty());
    }

    #[test]
    fn malformed_documents_are_errors() {
        // Given
        let mut coordinator = integer_coordinator();

        // Then
        assert!(matches!(
            coordinator.parse_str("{ \"integer\": "),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            coordinator.parse_str("[1, 2]"),
            Err(Error::UnexpectedJson(_))
        ));
        assert!(matches!(
            coordinator.parse_file("does/not/exist.json"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn clone_fresh_has_new_helpers_and_data() {
        // Given
        let mut coordinator = integer_coordinator();
        coordinator.parse_str(r#"{ "integer": 1 }"#).unwrap();

        // When
        let mut clone = coordinator.clone_fresh();
        clone.parse_str(r#"{ "integer": 2 }"#).unwrap();

        // Then
        assert!(clone.is_clone());
        assert!(!coordinator.is_clone());
        assert_eq!(clone.helpers().len(), 1);
        assert_eq!(clone.data().values(), &[2]);
        assert_eq!(coordinator.data().values(), &[1]);
    }

    #[test]
    fn remove_helper() {
        // Given
        let mut coordinator = integer_coordinator();

        // Then
        assert!(coordinator.remove_helper(1).is_none());
        assert!(coordinator.remove_helper(0).is_some());
        assert!(coordinator.helpers().is_empty());
    }

    #[test]
    fn helpers_ignore_foreign_containers() {
        // Given - a table helper in front of an integer container
        let mut coordinator = ParseCoordinator::new(IntegerData::default());
        coordinator.add_helper(Box::new(TableParseHelper::new()));
        coordinator.add_helper(Box::new(IntegerParseHelper::new()));

        // When
        coordinator.parse_str(r#"{ "integer": 3 }"#).unwrap();

        // Then
        assert_eq!(coordinator.data().values(), &[3]);

        // Given - and the reverse
        let mut tables = ParseCoordinator::new(TableData::default());
        tables.add_helper(Box::new(IntegerParseHelper::new()));
        tables.add_helper(Box::new(TableParseHelper::new()));

        // When
        tables.parse_str(r#"{ "integer": 3 }"#).unwrap();

        // Then - the table helper received it
        let data = tables.data();
        assert_eq!(data.tree()[data.root()]["integer"].get::<String>(0), Ok("3".to_string()));
    }
}
