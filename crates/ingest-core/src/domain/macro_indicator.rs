//! 거시경제 지표 레코드와 wide → long 변환.
//!
//! 통계 API의 지표 하나는 국가별 한 행, 연도별 한 열로 이루어진 wide 테이블입니다.
//! 적재 전에 (국가, 연도) 단위 long 형식으로 녹여(melt) 측정값 열 이름을 지표별로 바꿉니다.

use crate::types::{Column, ColumnType, Table, Value};
use serde::{Deserialize, Serialize};

/// 지표 코드와 적재 대상 매핑.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    /// 통계 API 지표 코드 (예: "NY.GDP.MKTP.KD.ZG")
    pub code: String,
    /// 관계형 저장소 테이블 이름
    pub table: String,
    /// long 형식의 측정값 열 이름
    pub measure: String,
    /// 스냅샷 파일 이름
    pub snapshot: String,
}

impl IndicatorSpec {
    pub fn new(code: &str, table: &str, measure: &str, snapshot: &str) -> Self {
        Self {
            code: code.to_string(),
            table: table.to_string(),
            measure: measure.to_string(),
            snapshot: snapshot.to_string(),
        }
    }

    /// GDP 성장률, 실업률, 중앙정부 부채 비율.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("NY.GDP.MKTP.KD.ZG", "gdp_data", "GDP", "Impact_gdb_data.csv"),
            Self::new(
                "SL.UEM.TOTL.ZS",
                "unemployment",
                "Unemployment_Percentage",
                "Impact_Unemployment.csv",
            ),
            Self::new(
                "GC.DOD.TOTL.GD.ZS",
                "central_government_debt",
                "central_government_debt",
                "Impact_central_government_debt.csv",
            ),
        ]
    }
}

/// (국가, 연도) 단위 지표 값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroIndicatorRecord {
    /// 국가/지역 이름
    pub country: String,
    /// 경제권 코드 (ISO3 또는 집계 코드)
    pub economy: String,
    /// 연도 라벨 ("YR2020")
    pub year: String,
    pub value: Option<f64>,
}

/// wide 테이블의 한 행 (경제권 하나).
#[derive(Debug, Clone, PartialEq)]
pub struct WideIndicatorRow {
    pub economy: String,
    pub country: String,
    /// `WideIndicatorTable::years`와 같은 순서
    pub values: Vec<Option<f64>>,
}

/// 경제권 × 연도 wide 테이블.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideIndicatorTable {
    pub years: Vec<String>,
    pub rows: Vec<WideIndicatorRow>,
}

impl WideIndicatorTable {
    /// (경제권, 국가명, 연도, 값) 관측치로 wide 테이블을 구성합니다.
    ///
    /// 연도 열은 오름차순, 경제권 행은 처음 등장한 순서를 따릅니다.
    /// 관측치가 없는 칸은 None입니다.
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = (String, String, i32, Option<f64>)>,
    {
        let observations: Vec<_> = observations.into_iter().collect();

        let mut years: Vec<i32> = observations.iter().map(|(_, _, y, _)| *y).collect();
        years.sort_unstable();
        years.dedup();

        let mut rows: Vec<WideIndicatorRow> = Vec::new();
        for (economy, country, year, value) in observations {
            let col = years.binary_search(&year).unwrap_or_default();
            let row = match rows.iter().position(|r| r.economy == economy) {
                Some(idx) => &mut rows[idx],
                None => {
                    rows.push(WideIndicatorRow {
                        economy,
                        country,
                        values: vec![None; years.len()],
                    });
                    let last = rows.len() - 1;
                    &mut rows[last]
                }
            };
            if value.is_some() {
                row.values[col] = value;
            }
        }

        Self {
            years: years.into_iter().map(|y| format!("YR{}", y)).collect(),
            rows,
        }
    }

    /// long 형식으로 변환합니다.
    ///
    /// 연도 열 순서대로, 각 연도 안에서는 행 순서대로 한 칸당 한 레코드를 만듭니다.
    /// 빈 칸도 `value: None`으로 유지합니다.
    pub fn melt(&self) -> Vec<MacroIndicatorRecord> {
        let mut records = Vec::with_capacity(self.years.len() * self.rows.len());
        for (col, year) in self.years.iter().enumerate() {
            for row in &self.rows {
                records.push(MacroIndicatorRecord {
                    country: row.country.clone(),
                    economy: row.economy.clone(),
                    year: year.clone(),
                    value: row.values.get(col).copied().flatten(),
                });
            }
        }
        records
    }
}

/// 지표 하나의 long 형식 결과.
#[derive(Debug, Clone)]
pub struct MacroIndicatorSeries {
    pub spec: IndicatorSpec,
    pub records: Vec<MacroIndicatorRecord>,
}

impl MacroIndicatorSeries {
    /// 열 {Country, economy, Year, <measure>} 테이블로 변환합니다.
    pub fn to_table(&self) -> Table {
        let columns = [
            Column::new("Country", ColumnType::Text),
            Column::new("economy", ColumnType::Text),
            Column::new("Year", ColumnType::Text),
            Column::new(self.spec.measure.clone(), ColumnType::Float),
        ];

        let rows = self.records.iter().map(|r| {
            [
                Value::Text(r.country.clone()),
                Value::Text(r.economy.clone()),
                Value::Text(r.year.clone()),
                r.value.into(),
            ]
        });
        Table::from_fixed_rows(self.spec.table.clone(), columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn obs(economy: &str, country: &str, year: i32, value: Option<f64>) -> (String, String, i32, Option<f64>) {
        (economy.to_string(), country.to_string(), year, value)
    }

    #[test]
    fn test_wide_from_observations() {
        let wide = WideIndicatorTable::from_observations(vec![
            obs("USA", "United States", 2021, Some(5.9)),
            obs("USA", "United States", 2020, Some(-2.2)),
            obs("DEU", "Germany", 2021, None),
        ]);

        assert_eq!(wide.years, vec!["YR2020", "YR2021"]);
        assert_eq!(wide.rows.len(), 2);
        assert_eq!(wide.rows[0].economy, "USA");
        assert_eq!(wide.rows[0].values, vec![Some(-2.2), Some(5.9)]);
        assert_eq!(wide.rows[1].values, vec![None, None]);
    }

    #[test]
    fn test_melt_keeps_empty_cells() {
        let wide = WideIndicatorTable::from_observations(vec![
            obs("USA", "United States", 2020, Some(-2.2)),
            obs("DEU", "Germany", 2021, Some(3.2)),
        ]);
        let long = wide.melt();

        // 2 경제권 × 2 연도
        assert_eq!(long.len(), 4);
        assert_eq!(long[0].year, "YR2020");
        assert_eq!(long[0].economy, "USA");
        assert_eq!(long[1].economy, "DEU");
        assert_eq!(long[1].value, None);
        assert_eq!(long[3].value, Some(3.2));
    }

    #[test]
    fn test_series_table_columns() {
        let spec = IndicatorSpec::defaults().remove(1);
        let series = MacroIndicatorSeries {
            records: vec![MacroIndicatorRecord {
                country: "Japan".into(),
                economy: "JPN".into(),
                year: "YR2022".into(),
                value: Some(2.6),
            }],
            spec,
        };
        let table = series.to_table();

        assert_eq!(table.name(), "unemployment");
        assert_eq!(
            table.column_names(),
            vec!["Country", "economy", "Year", "Unemployment_Percentage"]
        );
        assert_eq!(table.rows()[0][3], Value::Float(2.6));
    }

    #[test]
    fn test_default_specs() {
        let specs = IndicatorSpec::defaults();
        let tables: Vec<_> = specs.iter().map(|s| s.table.as_str()).collect();
        assert_eq!(tables, vec!["gdp_data", "unemployment", "central_government_debt"]);
    }

    proptest! {
        #[test]
        fn prop_melt_one_row_per_cell(
            economies in 1usize..8,
            years in prop::collection::btree_set(1960i32..2030, 1..10),
        ) {
            let mut observations = Vec::new();
            for e in 0..economies {
                for y in &years {
                    observations.push((format!("E{}", e), format!("Country {}", e), *y, Some(*y as f64)));
                }
            }
            let wide = WideIndicatorTable::from_observations(observations);
            let long = wide.melt();

            prop_assert_eq!(long.len(), economies * years.len());
            let mut keys: Vec<_> = long.iter().map(|r| (r.economy.clone(), r.year.clone())).collect();
            keys.sort();
            keys.dedup();
            prop_assert_eq!(keys.len(), long.len());
        }
    }
}
