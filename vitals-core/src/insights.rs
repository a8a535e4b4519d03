//! Khung "AI insights": giao diện sinh nhận định có thể thay thế và phiên chat.

use serde::{Deserialize, Serialize};

use crate::{patient_scores, resolve_all, DashboardError, Patient, Timeframe};

/// Bộ sinh nhận định. Bản mặc định là mẫu câu cố định; có thể thay bằng backend thật.
#[allow(async_fn_in_trait)]
pub trait InsightGenerator {
    async fn reply(&self, question: &str, patient: Option<&Patient>)
        -> Result<String, DashboardError>;

    /// Các câu tóm tắt hiển thị ở khung "Insights".
    fn highlights(&self, patient: Option<&Patient>, timeframe: Timeframe) -> Vec<String> {
        metric_highlights(patient, timeframe)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateInsights;

impl InsightGenerator for TemplateInsights {
    async fn reply(
        &self,
        question: &str,
        _patient: Option<&Patient>,
    ) -> Result<String, DashboardError> {
        Ok(format!(
            "Based on your insights, {question} might indicate a normal trend, but please consult a doctor for accuracy."
        ))
    }
}

/// Một câu tóm tắt cho mỗi chỉ số có giá trị trong khung thời gian,
/// rồi điểm theo ngưỡng tính trên trung bình toàn kỳ.
pub fn metric_highlights(patient: Option<&Patient>, timeframe: Timeframe) -> Vec<String> {
    let Some(record) = patient else {
        return Vec::new();
    };

    let mut lines: Vec<String> = resolve_all(patient, timeframe)
        .into_iter()
        .filter(|card| card.resolved.is_available())
        .map(|card| {
            let base = format!(
                "{} ({}): {} {}",
                card.title, timeframe, card.resolved.value, card.unit
            );
            match card.resolved.tone() {
                Some(_) => format!("{base}, trend {}.", card.resolved.trend),
                None => format!("{base}."),
            }
        })
        .collect();

    if lines.is_empty() {
        lines.push("No metric data is available for this timeframe yet.".to_string());
    }
    lines.extend(patient_scores(record).iter().map(|score| score.summary()));
    lines
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatExchange {
    pub question: String,
    pub answer: String,
}

/// Lịch sử hỏi đáp theo thứ tự gửi.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSession {
    exchanges: Vec<ChatExchange>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exchanges(&self) -> &[ChatExchange] {
        &self.exchanges
    }

    /// Gửi câu hỏi; đầu vào trống bị bỏ qua (`Ok(None)`), lỗi của bộ sinh không ghi vào lịch sử.
    pub async fn ask<G: InsightGenerator>(
        &mut self,
        generator: &G,
        input: &str,
        patient: Option<&Patient>,
    ) -> Result<Option<ChatExchange>, DashboardError> {
        let question = input.trim();
        if question.is_empty() {
            return Ok(None);
        }

        let answer = generator.reply(question, patient).await?;
        let exchange = ChatExchange {
            question: question.to_string(),
            answer,
        };
        self.exchanges.push(exchange.clone());
        Ok(Some(exchange))
    }

    /// Ghi một lượt đã có câu trả lời (dùng khi câu trả lời được tính ở nơi khác).
    pub fn record(&mut self, exchange: ChatExchange) {
        self.exchanges.push(exchange);
    }
}
