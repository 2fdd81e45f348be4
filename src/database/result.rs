use crate::document::Document;

/// Rows returned by [`DatabaseQuery::execute`](super::DatabaseQuery::execute), in backend order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutedQuery {
    rows: Vec<Document>,
}

impl ExecutedQuery {
    #[must_use]
    pub fn new(rows: Vec<Document>) -> Self {
        let rows = rows.into_iter().map(Document::mark_uneditable).collect();
        Self { rows }
    }

    #[must_use]
    pub fn first(&self) -> Option<&Document> {
        self.rows.first()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Document> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether at least one row matched.
    #[must_use]
    pub fn is_set(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.rows.iter()
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Document> {
        self.rows
    }
}

impl IntoIterator for ExecutedQuery {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExecutedQuery {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
