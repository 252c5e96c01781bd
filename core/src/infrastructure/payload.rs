// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// InvokeModel Payload Builder
//
// Renders the user message into the Llama 3 role-delimited prompt template
// and wraps it with the generation parameters the demo ships with.

use serde::{Deserialize, Serialize};

/// Generation parameters for InvokeModel. The defaults are policy, not
/// implementation detail; callers may override without changing them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_gen_len: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_gen_len: 512,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

/// Bedrock InvokeModel request body for Llama models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokePayload {
    pub prompt: String,
    pub max_gen_len: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Wrap a user message in the Llama 3 prompt format.
pub fn render_prompt(message: &str) -> String {
    format!(
        "<|begin_of_text|><|start_header_id|>user<|end_header_id|>\n\n\
         {message}<|eot_id|><|start_header_id|>assistant<|end_header_id|>\n\n"
    )
}

pub fn build_payload(message: &str) -> InvokePayload {
    build_payload_with(message, GenerationParams::default())
}

pub fn build_payload_with(message: &str, params: GenerationParams) -> InvokePayload {
    InvokePayload {
        prompt: render_prompt(message),
        max_gen_len: params.max_gen_len,
        temperature: params.temperature,
        top_p: params.top_p,
    }
}
