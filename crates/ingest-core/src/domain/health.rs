//! 보건 당국 공개 데이터셋.
//!
//! 스키마는 게시 기관이 정의하므로 타입을 고정하지 않고 [`Table`]로 보관합니다.

use crate::types::Table;

/// 다운로드한 두 보건 데이터셋.
#[derive(Debug, Clone)]
pub struct HealthDatasets {
    /// 전 세계 일별 확진/사망 수
    pub daily_cases: Table,
    /// 백신 접종 현황
    pub vaccination: Table,
    /// 이번 실행에서 내려받은 파일 수
    pub downloaded_files: usize,
}
