//! 범용 테이블 표현.
//!
//! 모든 추출 결과는 저장소 적재와 스냅샷 기록 직전에 [`Table`]로 변환됩니다.
//! 관계형 적재기와 스냅샷 기록기는 이 한 가지 형태만 다룹니다.

use crate::error::{IngestError, IngestResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

/// 열 타입.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64비트 정수
    Integer,
    /// 배정밀도 실수
    Float,
    /// 고정 소수점 숫자 (가격)
    Numeric,
    /// 문자열
    Text,
    /// 날짜
    Date,
}

impl ColumnType {
    /// PostgreSQL 열 타입 이름.
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Integer => "BIGINT",
            Self::Float => "DOUBLE PRECISION",
            Self::Numeric => "NUMERIC",
            Self::Text => "TEXT",
            Self::Date => "DATE",
        }
    }

    /// 문자열 셀 목록에서 열 타입을 추론합니다.
    ///
    /// 빈 셀은 무시합니다. 모든 셀이 비어 있으면 `Text`입니다.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut all_integer = true;
        let mut all_float = true;
        let mut all_date = true;
        let mut seen = false;

        for cell in cells.into_iter().map(str::trim).filter(|c| !c.is_empty()) {
            seen = true;
            if all_integer && cell.parse::<i64>().is_err() {
                all_integer = false;
            }
            if all_float && cell.parse::<f64>().is_err() {
                all_float = false;
            }
            if all_date && parse_date(cell).is_none() {
                all_date = false;
            }
            if !all_integer && !all_float && !all_date {
                break;
            }
        }

        match (seen, all_integer, all_float, all_date) {
            (false, ..) => Self::Text,
            (true, true, _, _) => Self::Integer,
            (true, _, true, _) => Self::Float,
            (true, _, _, true) => Self::Date,
            _ => Self::Text,
        }
    }
}

/// 테이블 열 정의.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// 테이블 셀 값.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Numeric(Decimal),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 문자열 셀을 지정한 열 타입으로 변환합니다.
    ///
    /// 빈 셀은 `Null`이 됩니다.
    pub fn parse_as(cell: &str, column_type: ColumnType) -> IngestResult<Self> {
        let cell = cell.trim();
        if cell.is_empty() {
            return Ok(Self::Null);
        }

        let parse_err = |kind: &str| IngestError::Parse(format!("'{}' → {}", cell, kind));

        Ok(match column_type {
            ColumnType::Integer => Self::Integer(cell.parse().map_err(|_| parse_err("integer"))?),
            ColumnType::Float => Self::Float(cell.parse().map_err(|_| parse_err("float"))?),
            ColumnType::Numeric => Self::Numeric(cell.parse().map_err(|_| parse_err("numeric"))?),
            ColumnType::Date => Self::Date(parse_date(cell).ok_or_else(|| parse_err("date"))?),
            ColumnType::Text => Self::Text(cell.to_string()),
        })
    }
}

impl From<Option<i64>> for Value {
    fn from(v: Option<i64>) -> Self {
        v.map(Value::Integer).unwrap_or(Value::Null)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map(Value::Float).unwrap_or(Value::Null)
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        v.map(Value::Text).unwrap_or(Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Numeric(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
        }
    }
}

/// 이름과 타입이 지정된 열, 그리고 행 목록으로 이루어진 테이블.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// 빈 테이블을 생성합니다.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// 행 타입 목록에서 테이블을 생성합니다.
    pub fn from_rows<R: TableRow>(name: impl Into<String>, rows: &[R]) -> Self {
        Self {
            name: name.into(),
            columns: R::columns(),
            rows: rows.iter().map(TableRow::values).collect(),
        }
    }

    /// 열 개수가 고정된 행 배열에서 테이블을 생성합니다.
    pub fn from_fixed_rows<const N: usize>(
        name: impl Into<String>,
        columns: [Column; N],
        rows: impl IntoIterator<Item = [Value; N]>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into(),
            rows: rows.into_iter().map(Vec::from).collect(),
        }
    }

    /// 헤더와 문자열 행으로 테이블을 생성합니다. 열 타입은 셀 값에서 추론합니다.
    pub fn from_text_rows(
        name: impl Into<String>,
        headers: Vec<String>,
        text_rows: Vec<Vec<String>>,
    ) -> IngestResult<Self> {
        let name = name.into();
        let width = headers.len();

        if let Some((idx, row)) = text_rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(IngestError::InvalidTable(format!(
                "{}: {}번째 행의 열 개수 {} (기대값 {})",
                name,
                idx + 1,
                row.len(),
                width
            )));
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .enumerate()
            .map(|(i, header)| {
                let ty = ColumnType::infer(text_rows.iter().map(|r| r[i].as_str()));
                Column::new(header, ty)
            })
            .collect();

        let mut table = Self::new(name, columns);
        for row in &text_rows {
            let values = row
                .iter()
                .zip(&table.columns)
                .map(|(cell, col)| Value::parse_as(cell, col.column_type))
                .collect::<IngestResult<Vec<_>>>()?;
            table.rows.push(values);
        }

        Ok(table)
    }

    /// 행을 추가합니다. 열 개수가 다르면 에러를 반환합니다.
    pub fn push_row(&mut self, row: Vec<Value>) -> IngestResult<()> {
        if row.len() != self.columns.len() {
            return Err(IngestError::InvalidTable(format!(
                "{}: 열 개수 {} (기대값 {})",
                self.name,
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// 특정 열의 값을 순회합니다.
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }
}

/// 테이블 한 행으로 변환 가능한 레코드.
pub trait TableRow {
    /// 열 정의 (순서는 [`TableRow::values`]와 일치해야 함)
    fn columns() -> Vec<Column>;

    /// 행 값
    fn values(&self) -> Vec<Value>;
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
