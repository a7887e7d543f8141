#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

/// `column = 'literal'`
#[derive(Debug, Clone, PartialEq)]
pub struct EqualityFilter {
    pub column_name: String,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    pub table_name: String,
    pub projection: Projection,
    pub filter: Option<EqualityFilter>,
    pub limit: Option<usize>,
}

impl SelectPlan {
    pub fn scan_all(table_name: impl Into<String>, limit: Option<usize>) -> Self {
        Self {
            table_name: table_name.into(),
            projection: Projection::All,
            filter: None,
            limit,
        }
    }

    pub fn filtered(
        table_name: impl Into<String>,
        columns: Vec<String>,
        column_name: impl Into<String>,
        literal: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            projection: Projection::Columns(columns),
            filter: Some(EqualityFilter {
                column_name: column_name.into(),
                literal: literal.into(),
            }),
            limit: None,
        }
    }
}
