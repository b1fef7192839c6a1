use log::warn;
use std::future::Future;
use std::time::Duration;

use crate::error::ClozeError;

/// 默认最大尝试次数
pub const MAX_RETRIES: u32 = 3;

/// 重试策略
///
/// 最大尝试次数 + 指数退避，等待方式由调用方传入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数
    pub max_attempts: u32,
    /// 第一次重试前的等待时长
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// 第 `attempt` 次尝试失败后的等待时长
    ///
    /// delay = base_delay * 2^(attempt - 1)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// 执行带重试的操作
    ///
    /// # 参数
    /// - `op`: 单次尝试，参数为从 1 开始的尝试序号
    /// - `sleep`: 两次尝试之间的等待函数
    ///
    /// # 返回
    /// 第一次成功的结果；全部失败时返回最后一次的错误
    pub async fn run<T, Op, Fut, Sleep, SleepFut>(
        &self,
        mut op: Op,
        mut sleep: Sleep,
    ) -> Result<T, ClozeError>
    where
        Op: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ClozeError>>,
        Sleep: FnMut(Duration) -> SleepFut,
        SleepFut: Future<Output = ()>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!("第 {}/{} 次尝试失败: {}", attempt, self.max_attempts, e);
                    last_error = Some(e);
                }
            }

            if attempt < self.max_attempts {
                sleep(self.delay_for(attempt)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ClozeError::NoCandidate("重试次数为 0，未执行任何尝试".to_string())
        }))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES, Duration::from_millis(1000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let sleeps = RefCell::new(Vec::new());

        let result = policy
            .run(
                |attempt| async move {
                    if attempt < 3 {
                        Err(ClozeError::TransientFetch(format!("attempt {}", attempt)))
                    } else {
                        Ok(attempt)
                    }
                },
                |delay| {
                    sleeps.borrow_mut().push(delay);
                    async {}
                },
            )
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(
            *sleeps.borrow(),
            vec![Duration::from_millis(10), Duration::from_millis(20)]
        );
    }

    #[tokio::test]
    async fn test_surfaces_last_error() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = RefCell::new(0u32);

        let result: Result<(), ClozeError> = policy
            .run(
                |attempt| {
                    *calls.borrow_mut() += 1;
                    async move { Err(ClozeError::TransientFetch(format!("HTTP 50{}", attempt))) }
                },
                |_| async {},
            )
            .await;

        assert_eq!(*calls.borrow(), 3);
        match result {
            Err(ClozeError::TransientFetch(msg)) => assert_eq!(msg, "HTTP 503"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = RefCell::new(0u32);

        let result: Result<(), ClozeError> = policy
            .run(
                |_| {
                    *calls.borrow_mut() += 1;
                    async { Err(ClozeError::Fallback("boom".to_string())) }
                },
                |_| async {},
            )
            .await;

        assert!(result.is_err());
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        let result: Result<(), ClozeError> =
            policy.run(|_| async { Ok(()) }, |_| async {}).await;
        assert!(matches!(result, Err(ClozeError::NoCandidate(_))));
    }
}
