// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use ethers::utils::to_checksum;
use penguin_mint::input::{parse_address, TaskRequest};
use penguin_mint::types::id::{decode_hex, decode_hex32};
use penguin_mint::DecodeError;
use serde::{Deserialize, Serialize};

/// Body of `POST /issue_task`, in the field names the web page sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTaskRequest {
    pub machine_hash: String,
    pub fixed_address: String,
    /// `0x`-prefixed hex of the task input.
    pub input: String,
}

impl IssueTaskRequest {
    pub fn from_task(task: &TaskRequest) -> Self {
        Self {
            machine_hash: task.machine_hash_hex(),
            fixed_address: to_checksum(&task.target_address, None),
            input: task.input_hex(),
        }
    }

    pub fn to_task(&self) -> Result<TaskRequest, DecodeError> {
        Ok(TaskRequest::new(
            decode_hex32(&self.machine_hash)?,
            parse_address(&self.fixed_address)?,
            decode_hex(&self.input)?,
        ))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
