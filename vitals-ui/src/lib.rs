//! Giao diện bảng điều khiển chỉ số bệnh nhân cho môi trường WebAssembly.

#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::rc::Rc;

    use chrono::{NaiveDate, Utc};
    use gloo_timers::future::TimeoutFuture;
    use serde_wasm_bindgen::from_value;
    use vitals_core::{
        chart_points, metric_highlights, prepare_patient, resolve_all, sort_patients, ChartPoint,
        ChatExchange, ChatSession, DashboardConfig, Gender, InsightGenerator, MetricCard,
        MetricKey, Patient, PatientDraft, SortKey, TemplateInsights, Timeframe, UploadedFile,
    };
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{console, Document, Element, HtmlInputElement, HtmlSelectElement, Window};
    use yew::events::{Event, InputEvent, KeyboardEvent};
    use yew::prelude::*;
    use yew::TargetCast;

    use crate::browser::{self, HttpFixtures};
    use crate::styles;

    const CHART_WIDTH: f64 = 600.0;
    const CHART_HEIGHT: f64 = 200.0;
    const CHART_PADDING: f64 = 16.0;

    #[derive(Clone, PartialEq)]
    enum IntakeStatus {
        Idle,
        Processing,
        Failed(String),
    }

    #[derive(Default, PartialEq)]
    struct ChatState {
        session: ChatSession,
        pending: bool,
    }

    enum ChatAction {
        Pending,
        Record(ChatExchange),
        Failed,
    }

    impl Reducible for ChatState {
        type Action = ChatAction;

        fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
            let mut session = self.session.clone();
            let pending = match action {
                ChatAction::Pending => true,
                ChatAction::Record(exchange) => {
                    session.record(exchange);
                    false
                }
                ChatAction::Failed => false,
            };
            Rc::new(Self { session, pending })
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct DashboardProps {
        pub config: DashboardConfig,
    }

    #[function_component(Dashboard)]
    fn dashboard(props: &DashboardProps) -> Html {
        let config = &props.config;

        use_effect_with((), |_| {
            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
            }
            || ()
        });

        let store = {
            let key = config.storage_key.clone();
            use_mut_ref(move || browser::open_store(&key))
        };
        let refresh = use_force_update();
        let selected = use_state(|| None::<String>);
        let timeframe = use_state(|| config.default_timeframe);
        let query = use_state(String::new);
        let sort_key = use_state(|| None::<SortKey>);
        let chart_metric = use_state(|| MetricKey::Heart);
        let show_insights = use_state(|| false);
        let intake = use_state(|| IntakeStatus::Idle);
        let chat = use_reducer(ChatState::default);

        let today = Utc::now().date_naive();
        let (entries, patient) = {
            let store = store.borrow();
            let mut visible = store.search(&query);
            if let Some(key) = *sort_key {
                sort_patients(&mut visible, key, today);
            }
            let entries: Vec<(String, String)> = visible
                .iter()
                .map(|patient| (patient.id.clone(), patient.full_name()))
                .collect();
            let patient = (*selected)
                .as_deref()
                .and_then(|id| store.get(id))
                .cloned();
            (entries, patient)
        };

        let on_select = {
            let selected = selected.clone();
            Callback::from(move |id: String| selected.set(Some(id)))
        };

        let on_search = {
            let query = query.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                query.set(input.value());
            })
        };

        let on_sort = {
            let sort_key = sort_key.clone();
            Callback::from(move |event: Event| {
                let select: HtmlSelectElement = event.target_unchecked_into();
                let key = select
                    .value()
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| SortKey::ALL.get(index).copied());
                sort_key.set(key);
            })
        };

        let on_admit = {
            let store = store.clone();
            let refresh = refresh.clone();
            let selected = selected.clone();
            let intake = intake.clone();
            let base_url = config.fixture_base_url.clone();
            let delay = config.processing_delay_ms;
            Callback::from(move |draft: PatientDraft| {
                if *intake == IntakeStatus::Processing {
                    return;
                }
                intake.set(IntakeStatus::Processing);

                let store = store.clone();
                let refresh = refresh.clone();
                let selected = selected.clone();
                let intake = intake.clone();
                let fixtures = HttpFixtures::new(base_url.clone());
                spawn_local(async move {
                    match prepare_patient(draft, &fixtures).await {
                        Ok(prepared) => {
                            TimeoutFuture::new(delay).await;
                            let patient = store.borrow_mut().add(prepared);
                            selected.set(Some(patient.id));
                            intake.set(IntakeStatus::Idle);
                            refresh.force_update();
                        }
                        Err(err) => {
                            console::warn_1(&JsValue::from_str(&format!(
                                "Không thêm được bệnh nhân: {err}"
                            )));
                            intake.set(IntakeStatus::Failed(err.to_string()));
                        }
                    }
                });
            })
        };

        let on_timeframe = {
            let timeframe = timeframe.clone();
            Callback::from(move |next: Timeframe| timeframe.set(next))
        };

        let on_chart_metric = {
            let chart_metric = chart_metric.clone();
            Callback::from(move |event: Event| {
                let select: HtmlSelectElement = event.target_unchecked_into();
                if let Some(key) = MetricKey::parse(&select.value()) {
                    chart_metric.set(key);
                }
            })
        };

        let on_toggle_insights = {
            let show_insights = show_insights.clone();
            Callback::from(move |_| show_insights.set(!*show_insights))
        };

        let on_ask = {
            let chat = chat.clone();
            let patient = patient.clone();
            let delay = config.chat_delay_ms;
            Callback::from(move |input: String| {
                let question = input.trim().to_string();
                if question.is_empty() || chat.pending {
                    return;
                }
                chat.dispatch(ChatAction::Pending);

                let chat = chat.clone();
                let patient = patient.clone();
                spawn_local(async move {
                    TimeoutFuture::new(delay).await;
                    match TemplateInsights.reply(&question, patient.as_ref()).await {
                        Ok(answer) => {
                            chat.dispatch(ChatAction::Record(ChatExchange { question, answer }))
                        }
                        Err(err) => {
                            console::warn_1(&JsValue::from_str(&format!(
                                "Không tạo được câu trả lời: {err}"
                            )));
                            chat.dispatch(ChatAction::Failed);
                        }
                    }
                });
            })
        };

        let timeframe_value = *timeframe;
        let cards = resolve_all(patient.as_ref(), timeframe_value);
        let points = chart_points(patient.as_ref(), chart_metric.as_str(), timeframe_value);

        html! {
            <div class="vitals-root">
                <aside class="vitals-sidebar">
                    <h2>{"Patients"}</h2>
                    <input
                        type="search"
                        placeholder="Search patients"
                        value={(*query).clone()}
                        oninput={on_search}
                        aria-label="Search patients by name"
                    />
                    <label>
                        {"Sort by"}
                        <select onchange={on_sort}>
                            <option value="" selected={sort_key.is_none()}>{"Insertion order"}</option>
                            { for SortKey::ALL.iter().enumerate().map(|(index, key)| html! {
                                <option value={index.to_string()} selected={*sort_key == Some(*key)}>
                                    { key.label() }
                                </option>
                            }) }
                        </select>
                    </label>
                    <IntakeForm
                        on_submit={on_admit}
                        status={(*intake).clone()}
                    />
                    { render_patient_list(&entries, (*selected).as_deref(), on_select) }
                </aside>
                <main class="vitals-main">
                    { render_overview(patient.as_ref(), today, *show_insights, on_toggle_insights) }
                    { render_timeframes(timeframe_value, on_timeframe) }
                    { render_cards(&cards) }
                    { render_chart(&points, *chart_metric, timeframe_value, on_chart_metric) }
                    {
                        if *show_insights {
                            html! {
                                <div class="vitals-insights">
                                    <section>
                                        <h2>{"Insights"}</h2>
                                        <ul>
                                            { for metric_highlights(patient.as_ref(), timeframe_value)
                                                .into_iter()
                                                .map(|line| html! { <li>{ line }</li> }) }
                                        </ul>
                                    </section>
                                    <ChatBox
                                        exchanges={chat.session.exchanges().to_vec()}
                                        pending={chat.pending}
                                        on_ask={on_ask}
                                    />
                                </div>
                            }
                        } else {
                            Html::default()
                        }
                    }
                </main>
            </div>
        }
    }

    #[derive(Clone, Default, PartialEq)]
    struct FormState {
        open: bool,
        given_name: String,
        family_name: String,
        gender: String,
        birth_date: String,
        height: String,
        weight: String,
        upload: Option<String>,
        error: Option<String>,
    }

    impl FormState {
        fn to_draft(&self) -> PatientDraft {
            PatientDraft {
                given_name: self.given_name.clone(),
                family_name: self.family_name.clone(),
                gender: self.gender.parse::<Gender>().ok(),
                birth_date: NaiveDate::parse_from_str(self.birth_date.trim(), "%Y-%m-%d").ok(),
                height_cm: parse_measurement(&self.height),
                weight_kg: parse_measurement(&self.weight),
                upload: self.upload.clone().map(|name| UploadedFile { name }),
            }
        }
    }

    /// Ô trống là "không khai báo"; giá trị không đọc được thành NaN để bị từ chối khi kiểm tra.
    fn parse_measurement(text: &str) -> Option<f64> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(text.parse::<f64>().unwrap_or(f64::NAN))
    }

    fn field_input(
        form: &UseStateHandle<FormState>,
        apply: fn(&mut FormState, String),
    ) -> Callback<InputEvent> {
        let form = form.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let mut next = (*form).clone();
            apply(&mut next, input.value());
            next.error = None;
            form.set(next);
        })
    }

    #[derive(Properties, PartialEq)]
    struct IntakeFormProps {
        on_submit: Callback<PatientDraft>,
        status: IntakeStatus,
    }

    #[function_component(IntakeForm)]
    fn intake_form(props: &IntakeFormProps) -> Html {
        let form = use_state(FormState::default);
        let file_ref = use_node_ref();
        let processing = props.status == IntakeStatus::Processing;

        let on_toggle = {
            let form = form.clone();
            Callback::from(move |_| {
                let mut next = (*form).clone();
                next.open = !next.open;
                form.set(next);
            })
        };

        let on_gender = {
            let form = form.clone();
            Callback::from(move |event: Event| {
                let select: HtmlSelectElement = event.target_unchecked_into();
                let mut next = (*form).clone();
                next.gender = select.value();
                next.error = None;
                form.set(next);
            })
        };

        let on_file = {
            let form = form.clone();
            Callback::from(move |event: Event| {
                let input: HtmlInputElement = event.target_unchecked_into();
                let mut next = (*form).clone();
                next.upload = input
                    .files()
                    .and_then(|files| files.get(0))
                    .map(|file| file.name());
                next.error = None;
                form.set(next);
            })
        };

        let on_save = {
            let form = form.clone();
            let file_ref = file_ref.clone();
            let on_submit = props.on_submit.clone();
            Callback::from(move |_| {
                let draft = form.to_draft();
                match draft.validate() {
                    Ok(()) => {
                        on_submit.emit(draft);
                        if let Some(input) = file_ref.cast::<HtmlInputElement>() {
                            input.set_value("");
                        }
                        form.set(FormState::default());
                    }
                    Err(err) => {
                        let mut next = (*form).clone();
                        next.error = Some(err.to_string());
                        form.set(next);
                    }
                }
            })
        };

        let banner = match &props.status {
            IntakeStatus::Idle => Html::default(),
            IntakeStatus::Processing => html! {
                <p class="vitals-banner-info">{"Processing health data..."}</p>
            },
            IntakeStatus::Failed(message) => html! {
                <p class="vitals-banner-error">{ message.clone() }</p>
            },
        };

        if !form.open {
            return html! {
                <>
                    <button type="button" class="vitals-button" onclick={on_toggle} disabled={processing}>
                        {"New Patient"}
                    </button>
                    { banner }
                </>
            };
        }

        html! {
            <div class="vitals-form">
                <label>{"First name"}
                    <input
                        value={form.given_name.clone()}
                        oninput={field_input(&form, |state, value| state.given_name = value)}
                    />
                </label>
                <label>{"Last name"}
                    <input
                        value={form.family_name.clone()}
                        oninput={field_input(&form, |state, value| state.family_name = value)}
                    />
                </label>
                <label>{"Gender"}
                    <select onchange={on_gender}>
                        <option value="" selected={form.gender.is_empty()}>{"Select"}</option>
                        { for Gender::ALL.iter().map(|gender| html! {
                            <option value={gender.label()} selected={form.gender == gender.label()}>
                                { gender.label() }
                            </option>
                        }) }
                    </select>
                </label>
                <label>{"Birth date"}
                    <input
                        type="date"
                        value={form.birth_date.clone()}
                        oninput={field_input(&form, |state, value| state.birth_date = value)}
                    />
                </label>
                <label>{"Height (cm)"}
                    <input
                        type="number"
                        value={form.height.clone()}
                        oninput={field_input(&form, |state, value| state.height = value)}
                    />
                </label>
                <label>{"Weight (kg)"}
                    <input
                        type="number"
                        value={form.weight.clone()}
                        oninput={field_input(&form, |state, value| state.weight = value)}
                    />
                </label>
                <label>{"Health export"}
                    <input type="file" ref={file_ref} onchange={on_file} />
                </label>
                <p class="vitals-form-hint">{"Export from your phone's health app."}</p>
                {
                    match &form.error {
                        Some(message) => html! { <p class="vitals-form-error">{ message.clone() }</p> },
                        None => Html::default(),
                    }
                }
                <button type="button" class="vitals-button" onclick={on_save} disabled={processing}>
                    {"Save"}
                </button>
                <button type="button" class="vitals-button" onclick={on_toggle}>{"Cancel"}</button>
                { banner }
            </div>
        }
    }

    #[derive(Properties, PartialEq)]
    struct ChatBoxProps {
        exchanges: Vec<ChatExchange>,
        pending: bool,
        on_ask: Callback<String>,
    }

    #[function_component(ChatBox)]
    fn chat_box(props: &ChatBoxProps) -> Html {
        let input = use_state(String::new);

        let on_input = {
            let input = input.clone();
            Callback::from(move |event: InputEvent| {
                let field: HtmlInputElement = event.target_unchecked_into();
                input.set(field.value());
            })
        };

        let send = {
            let input = input.clone();
            let on_ask = props.on_ask.clone();
            move || {
                if input.trim().is_empty() {
                    return;
                }
                on_ask.emit((*input).clone());
                input.set(String::new());
            }
        };

        let on_send = {
            let send = send.clone();
            Callback::from(move |_| send())
        };

        let on_keypress = Callback::from(move |event: KeyboardEvent| {
            if event.key() == "Enter" {
                send();
            }
        });

        html! {
            <section class="vitals-chat">
                <h2>{"Ask about your metrics"}</h2>
                <div class="vitals-chat-log" aria-live="polite">
                    { for props.exchanges.iter().map(|exchange| html! {
                        <>
                            <p class="vitals-chat-question">{ exchange.question.clone() }</p>
                            <p class="vitals-chat-answer">{ exchange.answer.clone() }</p>
                        </>
                    }) }
                    {
                        if props.pending {
                            html! { <p class="vitals-banner-info">{"Thinking..."}</p> }
                        } else {
                            Html::default()
                        }
                    }
                </div>
                <div class="vitals-chat-input">
                    <input
                        value={(*input).clone()}
                        placeholder="Ask a question"
                        oninput={on_input}
                        onkeypress={on_keypress}
                    />
                    <button type="button" class="vitals-button" onclick={on_send} disabled={props.pending}>
                        {"Send"}
                    </button>
                </div>
            </section>
        }
    }

    fn render_patient_list(
        entries: &[(String, String)],
        selected: Option<&str>,
        on_select: Callback<String>,
    ) -> Html {
        if entries.is_empty() {
            return html! { <p class="vitals-banner-info">{"No patients yet."}</p> };
        }

        html! {
            <ul class="vitals-patient-list">
                { for entries.iter().map(|(id, name)| {
                    let classes = classes!((selected == Some(id.as_str())).then_some("is-selected"));
                    let on_click = {
                        let on_select = on_select.clone();
                        let id = id.clone();
                        Callback::from(move |_| on_select.emit(id.clone()))
                    };
                    html! { <li class={classes} onclick={on_click}>{ name.clone() }</li> }
                }) }
            </ul>
        }
    }

    fn render_overview(
        patient: Option<&Patient>,
        today: NaiveDate,
        show_insights: bool,
        on_toggle: Callback<MouseEvent>,
    ) -> Html {
        let Some(patient) = patient else {
            return html! {
                <section class="vitals-empty">
                    {"Select a patient or add a new one to see their health metrics."}
                </section>
            };
        };

        let age = patient
            .age_on(today)
            .map(|age| format!("{age} years"))
            .unwrap_or_else(|| vitals_core::NOT_AVAILABLE.to_string());

        html! {
            <section class="vitals-overview">
                <div class="vitals-overview-grid">
                    { for patient.overview_fields().into_iter().map(|(label, value)| html! {
                        <div>
                            <p class="vitals-field-label">{ label }</p>
                            <p class="vitals-field-value">{ value }</p>
                        </div>
                    }) }
                    <div>
                        <p class="vitals-field-label">{"Age"}</p>
                        <p class="vitals-field-value">{ age }</p>
                    </div>
                </div>
                <button type="button" class="vitals-button" onclick={on_toggle}>
                    { if show_insights { "HIDE INSIGHTS" } else { "AI INSIGHTS" } }
                </button>
            </section>
        }
    }

    fn render_timeframes(active: Timeframe, on_change: Callback<Timeframe>) -> Html {
        html! {
            <div class="vitals-timeframes" role="group" aria-label="Timeframe">
                { for Timeframe::ALL.into_iter().map(|timeframe| {
                    let on_click = {
                        let on_change = on_change.clone();
                        Callback::from(move |_| on_change.emit(timeframe))
                    };
                    html! {
                        <button
                            type="button"
                            class={classes!((timeframe == active).then_some("is-active"))}
                            onclick={on_click}
                        >
                            { timeframe.label() }
                        </button>
                    }
                }) }
            </div>
        }
    }

    fn render_cards(cards: &[MetricCard]) -> Html {
        html! {
            <section class="vitals-cards">
                { for cards.iter().map(render_card) }
            </section>
        }
    }

    fn render_card(card: &MetricCard) -> Html {
        let tone = card
            .resolved
            .tone()
            .map(|tone| tone.as_str())
            .unwrap_or("none");
        let unit = if card.resolved.is_available() {
            html! { <span class="vitals-card-unit">{ card.unit.clone() }</span> }
        } else {
            Html::default()
        };

        html! {
            <article class="vitals-card" data-metric={card.key.as_str()}>
                <p class="vitals-card-title">{ card.title.clone() }</p>
                <div>
                    <span class="vitals-card-value">{ card.resolved.value.clone() }</span>
                    { unit }
                </div>
                <span class="vitals-trend" data-tone={tone}>{ card.resolved.trend.clone() }</span>
            </article>
        }
    }

    fn render_chart(
        points: &[ChartPoint],
        metric: MetricKey,
        timeframe: Timeframe,
        on_metric: Callback<Event>,
    ) -> Html {
        let body = if points.len() < 2 {
            html! { <p class="vitals-banner-info">{"Not enough data to draw a trend."}</p> }
        } else {
            let coordinates = chart_coordinates(points);
            let polyline = coordinates
                .iter()
                .map(|(x, y)| format!("{x:.1},{y:.1}"))
                .collect::<Vec<_>>()
                .join(" ");
            html! {
                <svg viewBox={format!("0 0 {CHART_WIDTH} {CHART_HEIGHT}")} role="img">
                    <polyline points={polyline} />
                    { for points.iter().zip(coordinates.iter()).map(|(point, (x, y))| html! {
                        <circle cx={format!("{x:.1}")} cy={format!("{y:.1}")} r="4">
                            <title>{ format!("{}: {:.2}", point.label.as_deref().unwrap_or(""), point.value) }</title>
                        </circle>
                    }) }
                </svg>
            }
        };

        html! {
            <section class="vitals-chart">
                <header>
                    <h2>{ format!("{} Trends ({})", metric.title(), timeframe) }</h2>
                    <select onchange={on_metric} aria-label="Chart metric">
                        { for MetricKey::ALL.into_iter().map(|key| html! {
                            <option value={key.as_str()} selected={key == metric}>{ key.title() }</option>
                        }) }
                    </select>
                </header>
                { body }
            </section>
        }
    }

    /// Tọa độ SVG, trục y đảo chiều; chuỗi phẳng được vẽ ở giữa.
    fn chart_coordinates(points: &[ChartPoint]) -> Vec<(f64, f64)> {
        let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
        let max = points
            .iter()
            .map(|p| p.value)
            .fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;
        let step = (CHART_WIDTH - 2.0 * CHART_PADDING) / (points.len().saturating_sub(1).max(1)) as f64;
        let drawable = CHART_HEIGHT - 2.0 * CHART_PADDING;

        points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let x = CHART_PADDING + step * index as f64;
                let ratio = if span > 0.0 {
                    (point.value - min) / span
                } else {
                    0.5
                };
                (x, CHART_PADDING + drawable * (1.0 - ratio))
            })
            .collect()
    }

    #[wasm_bindgen]
    pub fn mount_dashboard(selector: &str, config: JsValue) -> Result<(), JsValue> {
        let window: Window =
            web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Không truy cập được document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Selector lỗi: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("Không tìm thấy element theo selector"))?;

        let config: DashboardConfig = if config.is_undefined() || config.is_null() {
            DashboardConfig::default()
        } else {
            from_value(config)?
        };

        yew::Renderer::<Dashboard>::with_root_and_props(target, DashboardProps { config }).render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_dashboard;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_dashboard(_: &str, _: wasm_bindgen::JsValue) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "vitals-ui chỉ hỗ trợ biên dịch target wasm32",
    ))
}
