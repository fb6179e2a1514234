//! Scripted oracle for demos and tests.
//!
//! Serves pre-authored judgments in order, ignoring the request content.
//! An exhausted script is an oracle failure, which exercises the same
//! failure path a live oracle outage would.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use gavel_core::{Judgment, VerdictJudgment};

use super::{CourtroomOracle, JudgmentRequest, OracleError, VerdictRequest};

#[derive(Debug, Default)]
pub struct ScriptedOracle {
    judgments: Mutex<VecDeque<Judgment>>,
    verdicts: Mutex<VecDeque<VerdictJudgment>>,
}

impl ScriptedOracle {
    pub fn new(
        judgments: impl IntoIterator<Item = Judgment>,
        verdicts: impl IntoIterator<Item = VerdictJudgment>,
    ) -> Self {
        Self {
            judgments: Mutex::new(judgments.into_iter().collect()),
            verdicts: Mutex::new(verdicts.into_iter().collect()),
        }
    }

    pub fn push_judgment(&self, judgment: Judgment) {
        self.judgments.lock().push_back(judgment);
    }

    pub fn push_verdict(&self, verdict: VerdictJudgment) {
        self.verdicts.lock().push_back(verdict);
    }

    pub fn remaining_judgments(&self) -> usize {
        self.judgments.lock().len()
    }
}

#[async_trait]
impl CourtroomOracle for ScriptedOracle {
    async fn judge(&self, _request: &JudgmentRequest) -> Result<Judgment, OracleError> {
        self.judgments
            .lock()
            .pop_front()
            .ok_or_else(|| OracleError::Call("judgment script exhausted".to_string()))
    }

    async fn decide_verdict(
        &self,
        _request: &VerdictRequest,
    ) -> Result<VerdictJudgment, OracleError> {
        self.verdicts
            .lock()
            .pop_front()
            .ok_or_else(|| OracleError::Call("verdict script exhausted".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
