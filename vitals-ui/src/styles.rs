#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-vitals-ui]";

/// Default dashboard CSS; colours are exposed as custom properties for theming.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --vitals-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --vitals-bg: #f4f5f7;
  --vitals-card-bg: #ffffff;
  --vitals-border: rgba(148, 163, 184, 0.3);
  --vitals-radius: 14px;
  --vitals-text: #1f2933;
  --vitals-muted: #6b7280;
  --vitals-accent: #ef4444;
  --vitals-accent-dark: #b91c1c;
  --vitals-positive: #047857;
  --vitals-positive-bg: rgba(16, 185, 129, 0.14);
  --vitals-negative: #b42318;
  --vitals-negative-bg: rgba(180, 35, 24, 0.12);
  --vitals-chart-line: #ff3b3b;
}

.vitals-root {
  font-family: var(--vitals-font-family);
  color: var(--vitals-text);
  background: var(--vitals-bg);
  display: grid;
  grid-template-columns: 260px minmax(0, 1fr);
  min-height: 100vh;
}

.vitals-sidebar {
  background: var(--vitals-card-bg);
  border-right: 1px solid var(--vitals-border);
  padding: 18px;
  display: flex;
  flex-direction: column;
  gap: 12px;
  position: sticky;
  top: 0;
  height: 100vh;
  overflow-y: auto;
  box-sizing: border-box;
}

.vitals-sidebar h2 {
  margin: 0;
  font-size: 1.2rem;
}

.vitals-sidebar label {
  font-size: 0.8rem;
  color: var(--vitals-muted);
}

.vitals-sidebar input,
.vitals-sidebar select {
  width: 100%;
  padding: 8px;
  border: 1px solid var(--vitals-border);
  border-radius: 8px;
  box-sizing: border-box;
}

.vitals-button {
  background: var(--vitals-accent);
  color: #ffffff;
  border: 1px solid transparent;
  border-radius: 8px;
  padding: 8px 14px;
  font-weight: 600;
  cursor: pointer;
  transition: background 120ms ease, color 120ms ease;
}

.vitals-button:hover {
  background: #ffffff;
  color: var(--vitals-accent-dark);
  border-color: var(--vitals-accent-dark);
}

.vitals-button[disabled] {
  opacity: 0.6;
  cursor: progress;
}

.vitals-form {
  background: #f3f4f6;
  border-radius: 10px;
  padding: 12px;
  display: flex;
  flex-direction: column;
  gap: 8px;
}

.vitals-form-hint {
  font-size: 0.72rem;
  color: var(--vitals-muted);
  margin: 0;
}

.vitals-form-error,
.vitals-banner-error {
  color: var(--vitals-negative);
  background: var(--vitals-negative-bg);
  border-radius: 8px;
  padding: 6px 10px;
  font-size: 0.82rem;
}

.vitals-banner-info {
  color: var(--vitals-muted);
  font-size: 0.82rem;
}

.vitals-patient-list {
  list-style: none;
  margin: 0;
  padding: 0;
}

.vitals-patient-list li {
  padding: 8px;
  border-radius: 8px;
  cursor: pointer;
}

.vitals-patient-list li:hover,
.vitals-patient-list li.is-selected {
  background: #f3f4f6;
}

.vitals-main {
  padding: 24px;
  display: flex;
  flex-direction: column;
  gap: 20px;
}

.vitals-overview {
  display: flex;
  justify-content: space-between;
  align-items: flex-start;
  gap: 16px;
}

.vitals-overview-grid {
  display: grid;
  grid-template-columns: repeat(3, minmax(0, 1fr));
  gap: 12px 24px;
}

.vitals-field-label {
  font-size: 0.8rem;
  color: var(--vitals-muted);
  margin: 0;
}

.vitals-field-value {
  font-size: 1.05rem;
  font-weight: 600;
  margin: 2px 0 0;
}

.vitals-empty {
  background: var(--vitals-card-bg);
  border-radius: var(--vitals-radius);
  padding: 24px;
  text-align: center;
  color: var(--vitals-muted);
}

.vitals-timeframes {
  display: inline-flex;
  gap: 6px;
  background: var(--vitals-card-bg);
  border-radius: 999px;
  padding: 4px;
  align-self: flex-start;
}

.vitals-timeframes button {
  border: none;
  background: transparent;
  border-radius: 999px;
  padding: 6px 14px;
  cursor: pointer;
  color: var(--vitals-muted);
  font-weight: 600;
}

.vitals-timeframes button.is-active {
  background: var(--vitals-accent);
  color: #ffffff;
}

.vitals-cards {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(170px, 1fr));
  gap: 14px;
}

.vitals-card {
  background: var(--vitals-card-bg);
  border-radius: var(--vitals-radius);
  box-shadow: 0 4px 12px rgba(15, 23, 42, 0.06);
  padding: 14px;
  display: flex;
  flex-direction: column;
  gap: 6px;
  transition: transform 200ms ease-out;
}

.vitals-card:hover {
  transform: scale(1.03);
}

.vitals-card-title {
  font-size: 0.82rem;
  color: var(--vitals-muted);
  margin: 0;
}

.vitals-card-value {
  font-size: 1.5rem;
  font-weight: 700;
  font-variant-numeric: tabular-nums;
}

.vitals-card-unit {
  color: var(--vitals-muted);
  margin-left: 4px;
}

.vitals-trend {
  font-size: 0.82rem;
  font-weight: 600;
  border-radius: 999px;
  padding: 2px 8px;
  align-self: flex-start;
}

.vitals-trend[data-tone="positive"] {
  color: var(--vitals-positive);
  background: var(--vitals-positive-bg);
}

.vitals-trend[data-tone="negative"] {
  color: var(--vitals-negative);
  background: var(--vitals-negative-bg);
}

.vitals-trend[data-tone="none"] {
  color: var(--vitals-muted);
}

.vitals-chart {
  background: var(--vitals-card-bg);
  border-radius: var(--vitals-radius);
  padding: 18px;
}

.vitals-chart header {
  display: flex;
  justify-content: space-between;
  align-items: center;
}

.vitals-chart h2 {
  font-size: 1.05rem;
  margin: 0 0 8px;
}

.vitals-chart svg {
  width: 100%;
  height: 200px;
}

.vitals-chart polyline {
  fill: none;
  stroke: var(--vitals-chart-line);
  stroke-width: 3;
  stroke-linejoin: round;
  stroke-linecap: round;
}

.vitals-chart circle {
  fill: transparent;
}

.vitals-chart circle:hover {
  fill: #00c49f;
}

.vitals-insights {
  background: var(--vitals-card-bg);
  border-radius: var(--vitals-radius);
  box-shadow: 0 8px 24px rgba(15, 23, 42, 0.08);
  padding: 20px;
  display: flex;
  gap: 20px;
}

.vitals-insights > section {
  flex: 1;
}

.vitals-chat {
  background: #f9fafb;
  border-radius: 10px;
  padding: 14px;
  max-width: 360px;
  display: flex;
  flex-direction: column;
  gap: 8px;
}

.vitals-chat-log {
  height: 160px;
  overflow-y: auto;
  border: 1px solid var(--vitals-border);
  border-radius: 8px;
  background: #ffffff;
  padding: 8px;
  font-size: 0.88rem;
}

.vitals-chat-question {
  color: #2563eb;
  font-weight: 600;
  margin: 0;
}

.vitals-chat-answer {
  margin: 2px 0 10px;
}

.vitals-chat-input {
  display: flex;
  gap: 6px;
}

.vitals-chat-input input {
  flex: 1;
  padding: 8px;
  border: 1px solid var(--vitals-border);
  border-radius: 8px;
}

@media (max-width: 900px) {
  .vitals-root {
    grid-template-columns: 1fr;
  }

  .vitals-sidebar {
    position: static;
    height: auto;
  }

  .vitals-insights {
    flex-direction: column;
  }

  .vitals-chat {
    max-width: none;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document không có thẻ <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-vitals-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.dyn_into::<Node>()?)?;

    Ok(())
}
