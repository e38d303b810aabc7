//! SQL dialect metadata
//!
//! Drivers describe the dialect they speak with these types; consumers read
//! the metadata instead of hardcoding per-engine logic.

use std::borrow::Cow;

/// Information about a SQL keyword
#[derive(Debug, Clone)]
pub struct KeywordInfo {
    /// The keyword (e.g., "SELECT", "TOP")
    pub keyword: Cow<'static, str>,
    /// Category for grouping
    pub category: KeywordCategory,
    /// Brief description
    pub description: Option<Cow<'static, str>>,
}

impl KeywordInfo {
    pub const fn new(keyword: &'static str, category: KeywordCategory) -> Self {
        Self {
            keyword: Cow::Borrowed(keyword),
            category,
            description: None,
        }
    }

    pub const fn with_desc(
        keyword: &'static str,
        category: KeywordCategory,
        description: &'static str,
    ) -> Self {
        Self {
            keyword: Cow::Borrowed(keyword),
            category,
            description: Some(Cow::Borrowed(description)),
        }
    }
}

/// Categories of SQL keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    /// Data Query Language (SELECT, FROM, WHERE, etc.)
    Dql,
    /// Clauses (JOIN, ON, HAVING, GROUP BY, etc.)
    Clause,
    /// Operators (AND, OR, NOT, IN, LIKE, etc.)
    Operator,
    /// Engine-specific keywords
    EngineSpecific,
    /// Other keywords
    Other,
}

/// Information about a SQL function
#[derive(Debug, Clone)]
pub struct SqlFunctionInfo {
    /// Function name (e.g., "COUNT", "SUBSTRING")
    pub name: Cow<'static, str>,
    /// Category for grouping
    pub category: FunctionCategory,
    /// Brief description
    pub description: Option<Cow<'static, str>>,
    /// Function signature(s) for display
    pub signatures: Vec<Cow<'static, str>>,
}

impl SqlFunctionInfo {
    pub const fn new(name: &'static str, category: FunctionCategory) -> Self {
        Self {
            name: Cow::Borrowed(name),
            category,
            description: None,
            signatures: Vec::new(),
        }
    }

    pub fn with_signature(mut self, signature: &'static str) -> Self {
        self.signatures.push(Cow::Borrowed(signature));
        self
    }
}

/// Categories of SQL functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCategory {
    /// Aggregate functions (COUNT, SUM, AVG, etc.)
    Aggregate,
    /// String functions (CONCAT, SUBSTRING, etc.)
    String,
    /// Numeric/Math functions (ABS, ROUND, etc.)
    Numeric,
    /// Date/Time functions (GETDATE, DATEADD, etc.)
    DateTime,
    /// Type conversion (CAST, CONVERT, etc.)
    Conversion,
    /// Conditional (CASE, COALESCE, NULLIF, etc.)
    Conditional,
    /// Other
    Other,
}

/// Information about a SQL data type
#[derive(Debug, Clone)]
pub struct DataTypeInfo {
    /// Type name as reported by the engine (e.g., "nvarchar", "bigint")
    pub name: Cow<'static, str>,
    /// Category for grouping
    pub category: DataTypeCategory,
    /// Whether this type accepts a length/precision parameter
    pub accepts_length: bool,
    /// Default length if applicable
    pub default_length: Option<u32>,
    /// Maximum length if applicable
    pub max_length: Option<u64>,
}

impl DataTypeInfo {
    pub const fn new(name: &'static str, category: DataTypeCategory) -> Self {
        Self {
            name: Cow::Borrowed(name),
            category,
            accepts_length: false,
            default_length: None,
            max_length: None,
        }
    }

    pub fn with_length(mut self, default: Option<u32>, max: Option<u64>) -> Self {
        self.accepts_length = true;
        self.default_length = default;
        self.max_length = max;
        self
    }
}

/// Categories of SQL data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeCategory {
    Integer,
    Float,
    Decimal,
    String,
    Binary,
    Boolean,
    Time,
    DateTime,
    Uuid,
    Json,
    Other,
}

/// Comment style support
#[derive(Debug, Clone, Default)]
pub struct CommentStyles {
    /// Single-line comment prefix (e.g., "--")
    pub line_comment: Option<Cow<'static, str>>,
    /// Block comment start (e.g., "/*")
    pub block_comment_start: Option<Cow<'static, str>>,
    /// Block comment end (e.g., "*/")
    pub block_comment_end: Option<Cow<'static, str>>,
}

impl CommentStyles {
    pub const fn sql_standard() -> Self {
        Self {
            line_comment: Some(Cow::Borrowed("--")),
            block_comment_start: Some(Cow::Borrowed("/*")),
            block_comment_end: Some(Cow::Borrowed("*/")),
        }
    }
}

/// Complete dialect information provided by a driver
#[derive(Debug, Clone)]
pub struct DialectInfo {
    /// Dialect identifier (e.g., "kusto")
    pub id: Cow<'static, str>,
    /// Display name
    pub display_name: Cow<'static, str>,
    /// All supported keywords
    pub keywords: Vec<KeywordInfo>,
    /// All supported functions
    pub functions: Vec<SqlFunctionInfo>,
    /// All supported data types
    pub data_types: Vec<DataTypeInfo>,
    /// Identifier quote character (e.g., '[' for T-SQL)
    pub identifier_quote: char,
    /// String literal quote (usually '\'')
    pub string_quote: char,
    /// Whether identifiers are case-sensitive
    pub case_sensitive_identifiers: bool,
    /// Statement terminator (usually ';')
    pub statement_terminator: char,
    /// Comment styles supported
    pub comment_styles: CommentStyles,
}

impl Default for DialectInfo {
    fn default() -> Self {
        Self {
            id: Cow::Borrowed("generic"),
            display_name: Cow::Borrowed("SQL"),
            keywords: Vec::new(),
            functions: Vec::new(),
            data_types: Vec::new(),
            identifier_quote: '"',
            string_quote: '\'',
            case_sensitive_identifiers: false,
            statement_terminator: ';',
            comment_styles: CommentStyles::default(),
        }
    }
}

impl DialectInfo {
    /// Get keywords by category
    pub fn keywords_by_category(
        &self,
        category: KeywordCategory,
    ) -> impl Iterator<Item = &KeywordInfo> {
        self.keywords.iter().filter(move |k| k.category == category)
    }

    /// Get functions by category
    pub fn functions_by_category(
        &self,
        category: FunctionCategory,
    ) -> impl Iterator<Item = &SqlFunctionInfo> {
        self.functions
            .iter()
            .filter(move |f| f.category == category)
    }

    /// Check if a name is an aggregate function
    pub fn is_aggregate_function(&self, name: &str) -> bool {
        let name_upper = name.to_uppercase();
        self.functions.iter().any(|f| {
            f.category == FunctionCategory::Aggregate && f.name.to_uppercase() == name_upper
        })
    }

    /// Get all keyword names (for completion)
    pub fn keyword_names(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.keyword.as_ref())
    }

    /// Get all data type names (for completion)
    pub fn data_type_names(&self) -> impl Iterator<Item = &str> {
        self.data_types.iter().map(|t| t.name.as_ref())
    }
}
