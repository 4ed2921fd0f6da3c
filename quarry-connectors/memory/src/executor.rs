use std::{iter::Peekable, str::Chars};

use itertools::Itertools;
use quarry_connectors_base::common::{Command, CommandParams};
use quarry_core::{
    data::{DataType, DataValue},
    err::{bail, ensure, Context, Result},
};

use super::{MemoryDatabase, MemoryResultSet, MemoryTable};

/// A parsed command against the in-memory store
///
/// Only understands a handful of statement forms, this store is a testing
/// instrument rather than a query engine.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MemoryQueryExecutor {
    Select {
        table: String,
        projection: Projection,
        filter: Vec<(String, Operand)>,
    },
    Insert {
        table: String,
        cols: Option<Vec<String>>,
        values: Vec<Operand>,
    },
    Delete {
        table: String,
        filter: Vec<(String, Operand)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Projection {
    All,
    Count,
    Cols(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    /// A `?` parameter, numbered in order of appearance
    Ordinal(usize),
    /// A `:name` parameter
    Named(String),
    Literal(DataValue),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Str(String),
    Int(i64),
    Param,
    NamedParam(String),
    Star,
    Comma,
    Eq,
    LParen,
    RParen,
}

impl MemoryQueryExecutor {
    pub(crate) fn parse(query: &str) -> Result<Self> {
        let tokens =
            tokenise(query).with_context(|| format!("Failed to parse query \"{}\"", query))?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            params: 0,
        };

        let parsed = parser
            .parse_statement()
            .with_context(|| format!("Failed to parse query \"{}\"", query))?;

        Ok(parsed)
    }

    pub(crate) fn run(&self, data: &MemoryDatabase, command: &Command) -> Result<MemoryResultSet> {
        let binder = Binder::new(&command.params, self.ordinal_count())?;

        match self {
            Self::Select {
                table,
                projection,
                filter,
            } => data
                .with_data(table, |t| {
                    self.run_select(t, projection, filter, &binder, command)
                })
                .with_context(|| format!("Unknown table \"{}\"", table))?,
            Self::Insert {
                table,
                cols,
                values,
            } => data
                .with_data_mut(table, |t| Self::run_insert(t, cols, values, &binder))
                .with_context(|| format!("Unknown table \"{}\"", table))?,
            Self::Delete { table, filter } => data
                .with_data_mut(table, |t| Self::run_delete(t, filter, &binder))
                .with_context(|| format!("Unknown table \"{}\"", table))?,
        }
    }

    fn run_select(
        &self,
        table: &MemoryTable,
        projection: &Projection,
        filter: &[(String, Operand)],
        binder: &Binder,
        command: &Command,
    ) -> Result<MemoryResultSet> {
        let filter = Self::compile_filter(table, filter, binder)?;

        let rows = table
            .rows
            .iter()
            .filter(|row| Self::satisfies(row, &filter))
            .skip(command.skip.unwrap_or(0) as usize)
            .take(command.limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .collect_vec();

        let indexes = match projection {
            Projection::Count => {
                return MemoryResultSet::new(
                    vec![("count".into(), DataType::UInt64)],
                    vec![vec![DataValue::UInt64(rows.len() as u64)]],
                )
            }
            Projection::All => (0..table.cols.len()).collect_vec(),
            Projection::Cols(cols) => cols
                .iter()
                .map(|c| Self::col_index(table, c))
                .try_collect()?,
        };

        let data = rows
            .into_iter()
            .map(|row| indexes.iter().map(|i| row[*i].clone()).collect_vec())
            .collect_vec();

        let cols = indexes
            .iter()
            .enumerate()
            .map(|(pos, i)| {
                let r#type = data
                    .first()
                    .map(|row| row[pos].r#type())
                    .unwrap_or(DataType::Null);

                (table.cols[*i].clone(), r#type)
            })
            .collect();

        MemoryResultSet::new(cols, data)
    }

    fn run_insert(
        table: &mut MemoryTable,
        cols: &Option<Vec<String>>,
        values: &[Operand],
        binder: &Binder,
    ) -> Result<MemoryResultSet> {
        let indexes: Vec<usize> = match cols {
            Some(cols) => cols
                .iter()
                .map(|c| Self::col_index(table, c))
                .try_collect()?,
            None => (0..table.cols.len()).collect(),
        };

        ensure!(
            indexes.len() == values.len(),
            "Expected {} values, found {}",
            indexes.len(),
            values.len()
        );

        let mut row = vec![DataValue::Null; table.cols.len()];
        for (idx, value) in indexes.into_iter().zip(values.iter()) {
            row[idx] = binder.resolve(value)?;
        }

        table.rows.push(row);

        Self::affected(1)
    }

    fn run_delete(
        table: &mut MemoryTable,
        filter: &[(String, Operand)],
        binder: &Binder,
    ) -> Result<MemoryResultSet> {
        let filter = Self::compile_filter(table, filter, binder)?;
        let before = table.rows.len();

        table.rows.retain(|row| !Self::satisfies(row, &filter));

        Self::affected((before - table.rows.len()) as u64)
    }

    fn affected(count: u64) -> Result<MemoryResultSet> {
        MemoryResultSet::new(
            vec![("count".into(), DataType::UInt64)],
            vec![vec![DataValue::UInt64(count)]],
        )
    }

    fn compile_filter(
        table: &MemoryTable,
        filter: &[(String, Operand)],
        binder: &Binder,
    ) -> Result<Vec<(usize, DataValue)>> {
        filter
            .iter()
            .map(|(col, operand)| -> Result<(usize, DataValue)> {
                Ok((Self::col_index(table, col)?, binder.resolve(operand)?))
            })
            .try_collect()
    }

    fn satisfies(row: &[DataValue], filter: &[(usize, DataValue)]) -> bool {
        filter.iter().all(|(idx, value)| row[*idx].loosely_eq(value))
    }

    fn col_index(table: &MemoryTable, col: &str) -> Result<usize> {
        table
            .col_index(col)
            .with_context(|| format!("Unknown column \"{}\"", col))
    }

    fn ordinal_count(&self) -> usize {
        let is_ordinal = |o: &&Operand| matches!(o, Operand::Ordinal(_));

        match self {
            Self::Select { filter, .. } | Self::Delete { filter, .. } => {
                filter.iter().map(|(_, o)| o).filter(is_ordinal).count()
            }
            Self::Insert { values, .. } => values.iter().filter(is_ordinal).count(),
        }
    }
}

/// Resolves operands against the parameters bound to the command
struct Binder<'a> {
    params: &'a CommandParams,
}

impl<'a> Binder<'a> {
    fn new(params: &'a CommandParams, ordinals: usize) -> Result<Self> {
        if let CommandParams::Ordinal(values) = params {
            ensure!(
                values.len() == ordinals,
                "Expected {} positional parameters, found {}",
                ordinals,
                values.len()
            );
        }

        Ok(Self { params })
    }

    fn resolve(&self, operand: &Operand) -> Result<DataValue> {
        Ok(match (operand, self.params) {
            (Operand::Literal(value), _) => value.clone(),
            (Operand::Ordinal(idx), CommandParams::Ordinal(values)) => values
                .get(*idx)
                .cloned()
                .with_context(|| format!("Missing positional parameter {}", idx))?,
            (Operand::Named(name), CommandParams::Named(values)) => values
                .get(name)
                .cloned()
                .with_context(|| format!("Missing named parameter \"{}\"", name))?,
            (Operand::Ordinal(_), CommandParams::Named(_)) => {
                bail!("Cannot bind positional parameter \"?\" from named parameters")
            }
            (Operand::Named(name), CommandParams::Ordinal(_)) => {
                bail!(
                    "Cannot bind named parameter \":{}\" from positional parameters",
                    name
                )
            }
        })
    }
}

fn tokenise(query: &str) -> Result<Vec<Token>> {
    let mut chars = query.chars().peekable();
    let mut tokens = vec![];

    while let Some(c) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '*' => Token::Star,
            ',' => Token::Comma,
            '=' => Token::Eq,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '?' => Token::Param,
            ':' => {
                let name = take_word(&mut chars, String::new());
                ensure!(!name.is_empty(), "Expected parameter name after ':'");
                Token::NamedParam(name)
            }
            '\'' => {
                let mut str = String::new();
                loop {
                    match chars.next() {
                        Some('\'') if chars.peek() == Some(&'\'') => {
                            chars.next();
                            str.push('\'');
                        }
                        Some('\'') => break,
                        Some(c) => str.push(c),
                        None => bail!("Unterminated string literal"),
                    }
                }
                Token::Str(str)
            }
            c if c.is_ascii_digit() || c == '-' => {
                let digits = take_word(&mut chars, c.to_string());
                Token::Int(
                    digits
                        .parse()
                        .with_context(|| format!("Invalid integer \"{}\"", digits))?,
                )
            }
            c if c.is_alphanumeric() || c == '_' => Token::Word(take_word(&mut chars, c.to_string())),
            c => bail!("Unexpected character '{}'", c),
        };

        tokens.push(token);
    }

    Ok(tokens)
}

fn take_word(chars: &mut Peekable<Chars>, mut word: String) -> String {
    while let Some(c) = chars.peek().copied() {
        if !(c.is_alphanumeric() || c == '_') {
            break;
        }

        word.push(c);
        chars.next();
    }

    word
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    params: usize,
}

impl Parser {
    fn parse_statement(&mut self) -> Result<MemoryQueryExecutor> {
        let keyword = self.expect_word()?;

        let statement = match keyword.to_lowercase().as_str() {
            "select" => self.parse_select()?,
            "insert" => self.parse_insert()?,
            "delete" => self.parse_delete()?,
            other => bail!("Unsupported statement \"{}\"", other),
        };

        if let Some(token) = self.peek() {
            bail!("Unexpected trailing token {:?}", token);
        }

        Ok(statement)
    }

    fn parse_select(&mut self) -> Result<MemoryQueryExecutor> {
        let projection = if self.is_keyword("from") {
            Projection::All
        } else if self.consume(&Token::Star) {
            Projection::All
        } else if self.is_keyword("count") {
            self.pos += 1;
            self.expect(Token::LParen)?;
            self.expect(Token::Star)?;
            self.expect(Token::RParen)?;
            Projection::Count
        } else {
            let mut cols = vec![self.expect_word()?];
            while self.consume(&Token::Comma) {
                cols.push(self.expect_word()?);
            }
            Projection::Cols(cols)
        };

        self.expect_keyword("from")?;
        let table = self.expect_word()?;
        let filter = self.parse_where()?;

        Ok(MemoryQueryExecutor::Select {
            table,
            projection,
            filter,
        })
    }

    fn parse_insert(&mut self) -> Result<MemoryQueryExecutor> {
        self.expect_keyword("into")?;
        let table = self.expect_word()?;

        let cols = if self.consume(&Token::LParen) {
            let mut cols = vec![self.expect_word()?];
            while self.consume(&Token::Comma) {
                cols.push(self.expect_word()?);
            }
            self.expect(Token::RParen)?;
            Some(cols)
        } else {
            None
        };

        self.expect_keyword("values")?;
        self.expect(Token::LParen)?;
        let mut values = vec![self.parse_operand()?];
        while self.consume(&Token::Comma) {
            values.push(self.parse_operand()?);
        }
        self.expect(Token::RParen)?;

        Ok(MemoryQueryExecutor::Insert {
            table,
            cols,
            values,
        })
    }

    fn parse_delete(&mut self) -> Result<MemoryQueryExecutor> {
        self.expect_keyword("from")?;
        let table = self.expect_word()?;
        let filter = self.parse_where()?;

        Ok(MemoryQueryExecutor::Delete { table, filter })
    }

    fn parse_where(&mut self) -> Result<Vec<(String, Operand)>> {
        let mut filter = vec![];

        if !self.is_keyword("where") {
            return Ok(filter);
        }

        self.pos += 1;

        loop {
            let col = self.expect_word()?;
            self.expect(Token::Eq)?;
            filter.push((col, self.parse_operand()?));

            if !self.is_keyword("and") {
                break;
            }
            self.pos += 1;
        }

        Ok(filter)
    }

    fn parse_operand(&mut self) -> Result<Operand> {
        let token = self.next().context("Expected operand, found end of query")?;

        Ok(match token {
            Token::Param => {
                self.params += 1;
                Operand::Ordinal(self.params - 1)
            }
            Token::NamedParam(name) => Operand::Named(name),
            Token::Str(str) => Operand::Literal(DataValue::Utf8String(str)),
            Token::Int(int) => Operand::Literal(DataValue::Int64(int)),
            Token::Word(word) => match word.to_lowercase().as_str() {
                "true" => Operand::Literal(DataValue::Boolean(true)),
                "false" => Operand::Literal(DataValue::Boolean(false)),
                "null" => Operand::Literal(DataValue::Null),
                _ => bail!("Unexpected operand \"{}\"", word),
            },
            other => bail!("Unexpected operand {:?}", other),
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            other => bail!("Expected {:?}, found {:?}", token, other),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if !self.is_keyword(keyword) {
            bail!("Expected \"{}\", found {:?}", keyword, self.peek());
        }

        self.pos += 1;
        Ok(())
    }

    fn expect_word(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Word(word)) => Ok(word),
            other => bail!("Expected identifier, found {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use quarry_connectors_base::interface::ResultSet;
    use quarry_core::data::Record;

    use super::*;

    fn mock_data() -> MemoryDatabase {
        let data = MemoryDatabase::new();

        data.set_data(
            "people",
            MemoryTable::new(
                vec!["id", "name", "active"],
                vec![
                    vec![
                        DataValue::Int32(1),
                        DataValue::from("Mary"),
                        DataValue::Boolean(true),
                    ],
                    vec![
                        DataValue::Int32(2),
                        DataValue::from("John"),
                        DataValue::Boolean(false),
                    ],
                    vec![
                        DataValue::Int32(3),
                        DataValue::from("Gary"),
                        DataValue::Boolean(true),
                    ],
                ],
            ),
        );

        data
    }

    fn run(data: &MemoryDatabase, command: Command) -> Result<Vec<Record>> {
        MemoryQueryExecutor::parse(command.text())?
            .run(data, &command)?
            .read_all()
    }

    fn names(rows: Vec<Record>) -> Vec<String> {
        rows.into_iter()
            .map(|r| r.get("name").unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_parse_select_forms() {
        assert_eq!(
            MemoryQueryExecutor::parse("select from people").unwrap(),
            MemoryQueryExecutor::Select {
                table: "people".into(),
                projection: Projection::All,
                filter: vec![]
            }
        );
        assert_eq!(
            MemoryQueryExecutor::parse("SELECT count(*) FROM people WHERE a = ? AND b = :b")
                .unwrap(),
            MemoryQueryExecutor::Select {
                table: "people".into(),
                projection: Projection::Count,
                filter: vec![
                    ("a".into(), Operand::Ordinal(0)),
                    ("b".into(), Operand::Named("b".into()))
                ]
            }
        );
        assert_eq!(
            MemoryQueryExecutor::parse("select id, name from people where name = 'O''Neil'")
                .unwrap(),
            MemoryQueryExecutor::Select {
                table: "people".into(),
                projection: Projection::Cols(vec!["id".into(), "name".into()]),
                filter: vec![(
                    "name".into(),
                    Operand::Literal(DataValue::from("O'Neil"))
                )]
            }
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(MemoryQueryExecutor::parse("").is_err());
        assert!(MemoryQueryExecutor::parse("update people").is_err());
        assert!(MemoryQueryExecutor::parse("select from").is_err());
        assert!(MemoryQueryExecutor::parse("select from people where").is_err());
        assert!(MemoryQueryExecutor::parse("select from people where a = 'x").is_err());
        assert!(MemoryQueryExecutor::parse("select from people people").is_err());
        assert!(MemoryQueryExecutor::parse("select from people where a = b").is_err());
    }

    #[test]
    fn test_select_all() {
        let rows = run(&mock_data(), Command::query("select from people")).unwrap();

        assert_eq!(names(rows), vec!["Mary", "John", "Gary"]);
    }

    #[test]
    fn test_select_filter_ordinal() {
        let rows = run(
            &mock_data(),
            Command::query("select * from people where active = ? and id = ?").with_params(
                CommandParams::Ordinal(vec![DataValue::Boolean(true), DataValue::Int64(3)]),
            ),
        )
        .unwrap();

        assert_eq!(names(rows), vec!["Gary"]);
    }

    #[test]
    fn test_select_filter_named() {
        let rows = run(
            &mock_data(),
            Command::query("select name from people where name = :name").with_params(
                CommandParams::Named(BTreeMap::from([(
                    "name".to_string(),
                    DataValue::from("John"),
                )])),
            ),
        )
        .unwrap();

        assert_eq!(rows, vec![Record::default().with("name", "John")]);
    }

    #[test]
    fn test_select_param_mode_mismatch() {
        let data = mock_data();

        assert!(run(
            &data,
            Command::query("select from people where id = ?").with_params(CommandParams::Named(
                BTreeMap::from([("id".to_string(), DataValue::Int32(1))])
            )),
        )
        .is_err());
        assert!(run(
            &data,
            Command::query("select from people where id = :id")
                .with_params(CommandParams::Ordinal(vec![])),
        )
        .is_err());
        assert!(run(
            &data,
            Command::query("select from people where id = ?")
                .with_params(CommandParams::Ordinal(vec![])),
        )
        .is_err());
    }

    #[test]
    fn test_select_skip_limit() {
        let rows = run(
            &mock_data(),
            Command::query("select from people")
                .with_skip(Some(1))
                .with_limit(Some(1)),
        )
        .unwrap();

        assert_eq!(names(rows), vec!["John"]);
    }

    #[test]
    fn test_select_count() {
        let rows = run(
            &mock_data(),
            Command::query("select count(*) from people where active = true"),
        )
        .unwrap();

        assert_eq!(
            rows,
            vec![Record::default().with("count", DataValue::UInt64(2))]
        );
    }

    #[test]
    fn test_select_unknown_table_or_column() {
        let data = mock_data();

        assert!(run(&data, Command::query("select from missing")).is_err());
        assert!(run(&data, Command::query("select missing from people")).is_err());
        assert!(run(&data, Command::query("select from people where missing = 1")).is_err());
    }

    #[test]
    fn test_insert_and_delete() {
        let data = mock_data();

        let inserted = run(
            &data,
            Command::query("insert into people (id, name) values (?, 'Sue')")
                .with_params(CommandParams::Ordinal(vec![DataValue::Int32(4)])),
        )
        .unwrap();
        assert_eq!(
            inserted,
            vec![Record::default().with("count", DataValue::UInt64(1))]
        );
        assert_eq!(
            data.get_data("people").unwrap().rows[3],
            vec![DataValue::Int32(4), DataValue::from("Sue"), DataValue::Null]
        );

        let deleted = run(
            &data,
            Command::query("delete from people where active = true"),
        )
        .unwrap();
        assert_eq!(
            deleted,
            vec![Record::default().with("count", DataValue::UInt64(2))]
        );

        assert_eq!(
            names(run(&data, Command::query("select from people")).unwrap()),
            vec!["John", "Sue"]
        );
    }

    #[test]
    fn test_insert_value_count_mismatch() {
        assert!(run(
            &mock_data(),
            Command::query("insert into people values (1, 'a')"),
        )
        .is_err());
    }
}
