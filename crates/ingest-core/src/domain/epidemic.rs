//! 지역별 역학 시계열 레코드.

use crate::types::{Column, ColumnType, TableRow, Value};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// (지역, 날짜) 단위 누적 확진/사망 수.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpidemicRecord {
    pub date: NaiveDate,
    pub cases: Option<i64>,
    pub deaths: Option<i64>,
    pub state: String,
}

impl TableRow for EpidemicRecord {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("date", ColumnType::Date),
            Column::new("cases", ColumnType::Integer),
            Column::new("deaths", ColumnType::Integer),
            Column::new("state", ColumnType::Text),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Date(self.date),
            self.cases.into(),
            self.deaths.into(),
            Value::Text(self.state.clone()),
        ]
    }
}
