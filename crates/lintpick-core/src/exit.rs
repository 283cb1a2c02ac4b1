//! 分析进程退出码解释
use std::fmt;

/// 引擎退出状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// 问题数超过阈值（分析本身成功）
    FailThreshold,
    LicenseExpired,
    OutOfMemory,
    Timeout,
    Failure(i32),
}

impl ExitStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ExitStatus::Success,
            255 => ExitStatus::FailThreshold,
            7 => ExitStatus::LicenseExpired,
            137 => ExitStatus::OutOfMemory,
            1000 => ExitStatus::Timeout,
            other => ExitStatus::Failure(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::FailThreshold => 255,
            ExitStatus::LicenseExpired => 7,
            ExitStatus::OutOfMemory => 137,
            ExitStatus::Timeout => 1000,
            ExitStatus::Failure(code) => code,
        }
    }

    /// 是否为分析失败（成功与超阈值都不算）
    pub fn is_failure(self) -> bool {
        !matches!(self, ExitStatus::Success | ExitStatus::FailThreshold)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Success => write!(f, "analysis finished successfully"),
            ExitStatus::FailThreshold => write!(f, "analysis found more problems than the fail threshold allows"),
            ExitStatus::LicenseExpired => write!(f, "license expired"),
            ExitStatus::OutOfMemory => write!(f, "analysis ran out of memory, consider raising the container memory limit"),
            ExitStatus::Timeout => write!(f, "analysis timed out"),
            ExitStatus::Failure(code) => write!(f, "analysis failed with exit code {code}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(ExitStatus::from_code(0), ExitStatus::Success);
        assert_eq!(ExitStatus::from_code(255), ExitStatus::FailThreshold);
        assert_eq!(ExitStatus::from_code(137), ExitStatus::OutOfMemory);
        assert_eq!(ExitStatus::from_code(42), ExitStatus::Failure(42));
        for code in [0, 7, 137, 255, 1000, 3] {
            assert_eq!(ExitStatus::from_code(code).code(), code);
        }
    }

    #[test]
    fn failure_classification() {
        assert!(!ExitStatus::Success.is_failure());
        assert!(!ExitStatus::FailThreshold.is_failure());
        assert!(ExitStatus::LicenseExpired.is_failure());
        assert!(ExitStatus::Timeout.is_failure());
        assert!(ExitStatus::Failure(1).is_failure());
    }
}
