//! 증권 시세 레코드.

use crate::types::{Column, ColumnType, TableRow, Value};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// (날짜, 티커) 단위 일봉 시세 + 회사명.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// 수정 종가
    pub adj_close: Decimal,
    pub volume: i64,
    /// 메타데이터 조회 실패 시 None
    pub company_name: Option<String>,
}

impl TableRow for SecurityRecord {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("Date", ColumnType::Date),
            Column::new("Ticker", ColumnType::Text),
            Column::new("Open", ColumnType::Numeric),
            Column::new("High", ColumnType::Numeric),
            Column::new("Low", ColumnType::Numeric),
            Column::new("Close", ColumnType::Numeric),
            Column::new("Adj Close", ColumnType::Numeric),
            Column::new("Volume", ColumnType::Integer),
            Column::new("Company Name", ColumnType::Text),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Date(self.date),
            Value::Text(self.ticker.clone()),
            Value::Numeric(self.open),
            Value::Numeric(self.high),
            Value::Numeric(self.low),
            Value::Numeric(self.close),
            Value::Numeric(self.adj_close),
            Value::Integer(self.volume),
            self.company_name.clone().into(),
        ]
    }
}

/// 시세 레코드를 (날짜, 티커) 순으로 정렬합니다.
pub fn sort_security_records(records: &mut [SecurityRecord]) {
    records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.ticker.cmp(&b.ticker)));
}
