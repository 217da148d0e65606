//! Browser front end
//!
//! Wires the page's controls to the shared sentiview logic. All page state
//! lives in one [`PageState`] behind the [`Page`] handle that every event
//! handler holds; `RefCell` borrows are never held across an `.await`.
//!
//! Expected element ids: `text-input`, `analyze-text-button`, `result-area`,
//! `drop-zone`, `file-input`, `image-preview-container`, `analyze-image-button`.

mod dom;
mod fetch;

use sentiview::dispatch::{
    decode_response, text_body, validate_text, Flight, ANALYZE_IMAGE_PATH, ANALYZE_TEXT_PATH,
    IMAGE_FIELD,
};
use sentiview::report::{escape_html, html};
use sentiview::staging::StageTicket;
use sentiview::{Action, AnalysisResult, Config, DropZone, ImageSource, SubmitError};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    console, DragEvent, Event, File, FileReader, HtmlButtonElement, HtmlElement, HtmlInputElement,
};

/// A browser `File` held in the drop zone.
struct BrowserFile(File);

impl ImageSource for BrowserFile {
    fn name(&self) -> String {
        self.0.name()
    }

    fn mime_type(&self) -> String {
        self.0.type_()
    }
}

#[derive(Default)]
struct PageState {
    zone: DropZone<BrowserFile>,
    text_flight: Flight,
}

struct Page {
    config: Config,
    text_input: HtmlElement,
    analyze_text_button: HtmlButtonElement,
    result_area: HtmlElement,
    drop_zone: HtmlElement,
    file_input: HtmlInputElement,
    preview_container: HtmlElement,
    analyze_image_button: HtmlButtonElement,
    state: RefCell<PageState>,
}

impl Page {
    fn from_document(config: Config) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        Ok(Self {
            config,
            text_input: dom::element_by_id(&document, "text-input")?,
            analyze_text_button: dom::element_by_id(&document, "analyze-text-button")?,
            result_area: dom::element_by_id(&document, "result-area")?,
            drop_zone: dom::element_by_id(&document, "drop-zone")?,
            file_input: dom::element_by_id(&document, "file-input")?,
            preview_container: dom::element_by_id(&document, "image-preview-container")?,
            analyze_image_button: dom::element_by_id(&document, "analyze-image-button")?,
            state: RefCell::new(PageState::default()),
        })
    }

    fn wire(self: &Rc<Self>) -> Result<(), JsValue> {
        let page = Rc::clone(self);
        dom::listen(&self.analyze_text_button, "click", move |_| {
            wasm_bindgen_futures::spawn_local(Rc::clone(&page).submit_text());
        })?;

        let page = Rc::clone(self);
        dom::listen(&self.analyze_image_button, "click", move |_| {
            wasm_bindgen_futures::spawn_local(Rc::clone(&page).submit_image());
        })?;

        let page = Rc::clone(self);
        dom::listen(&self.drop_zone, "click", move |_| page.file_input.click())?;

        let page = Rc::clone(self);
        dom::listen(&self.drop_zone, "dragover", move |event: Event| {
            event.prevent_default();
            page.state.borrow_mut().zone.drag_enter();
            page.sync_controls();
        })?;

        let page = Rc::clone(self);
        dom::listen(&self.drop_zone, "dragleave", move |_| {
            page.state.borrow_mut().zone.drag_leave();
            page.sync_controls();
        })?;

        let page = Rc::clone(self);
        dom::listen(&self.drop_zone, "drop", move |event: Event| {
            event.prevent_default();
            page.state.borrow_mut().zone.drag_leave();
            page.sync_controls();

            let file = event
                .dyn_ref::<DragEvent>()
                .and_then(|e| e.data_transfer())
                .and_then(|dt| dom::first_file(dt.files()));
            if let Some(file) = file {
                page.handle_file(file);
            }
        })?;

        let page = Rc::clone(self);
        dom::listen(&self.file_input, "change", move |_| {
            if let Some(file) = dom::first_file(page.file_input.files()) {
                page.handle_file(file);
            }
        })?;

        self.sync_controls();
        Ok(())
    }

    /// Reflect zone state onto the submit button and drop highlight.
    fn sync_controls(&self) {
        let state = self.state.borrow();
        self.analyze_image_button.set_disabled(!state.zone.can_submit());
        dom::set_class(&self.drop_zone, "dragover", state.zone.is_drag_over());
    }

    fn handle_file(self: &Rc<Self>, file: File) {
        let staged = self.state.borrow_mut().zone.stage(BrowserFile(file.clone()));
        self.preview_container.set_inner_html("");
        self.sync_controls();

        match staged {
            Ok(ticket) => {
                if let Err(e) = self.read_preview(&file, ticket) {
                    console::warn_2(&"preview failed".into(), &e);
                }
            }
            Err(e) => self.show_error(e.user_message()),
        }
    }

    /// Decode the file to a data URL in the background. Only the preview
    /// waits on this; the file is already submittable.
    fn read_preview(self: &Rc<Self>, file: &File, ticket: StageTicket) -> Result<(), JsValue> {
        let reader = FileReader::new()?;
        let page = Rc::clone(self);
        let loaded = reader.clone();

        let onload = Closure::once(move |_: Event| {
            let Some(url) = loaded.result().ok().and_then(|v| v.as_string()) else {
                return;
            };
            let accepted = page.state.borrow_mut().zone.set_preview(ticket, url.clone());
            if accepted {
                page.preview_container.set_inner_html(&format!(
                    r#"<img src="{}" alt="選択された画像">"#,
                    escape_html(&url)
                ));
            }
        });

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        reader.read_as_data_url(file)?;
        onload.forget();
        Ok(())
    }

    async fn submit_text(self: Rc<Self>) {
        let text = dom::text_value(&self.text_input);
        if let Err(e) = validate_text(&text) {
            self.show_error(e.user_message());
            return;
        }

        let begun = self.state.borrow_mut().text_flight.begin(Action::Text);
        if let Err(e) = begun {
            console::warn_1(&e.to_string().into());
            return;
        }

        dom::set_text_value(&self.text_input, "");
        self.analyze_text_button.set_disabled(true);

        let url = self.config.url(ANALYZE_TEXT_PATH);
        let outcome = fetch::post_json(&url, &text_body(&text))
            .await
            .map_err(|source| SubmitError::Network { action: Action::Text, source })
            .and_then(|body| decode_response(Action::Text, body));

        self.state.borrow_mut().text_flight.end();
        self.analyze_text_button.set_disabled(false);
        self.show_outcome(outcome, None);
    }

    async fn submit_image(self: Rc<Self>) {
        let taken = self.state.borrow_mut().zone.take_for_submit();
        let submission = match taken {
            Ok(s) => s,
            Err(e @ SubmitError::InFlight(_)) => {
                console::warn_1(&e.to_string().into());
                return;
            }
            Err(e) => {
                self.show_error(e.user_message());
                return;
            }
        };

        // Reset the picker so the same file can be chosen again
        self.preview_container.set_inner_html("");
        self.file_input.set_value("");
        self.sync_controls();

        let url = self.config.url(ANALYZE_IMAGE_PATH);
        let outcome = fetch::post_file(&url, IMAGE_FIELD, &submission.file.0)
            .await
            .map_err(|source| SubmitError::Network { action: Action::Image, source })
            .and_then(|body| decode_response(Action::Image, body));

        self.state.borrow_mut().zone.finish(outcome.is_ok());
        self.sync_controls();
        self.show_outcome(outcome, submission.preview.as_deref());
    }

    fn show_outcome(&self, outcome: Result<AnalysisResult, SubmitError>, preview: Option<&str>) {
        match outcome {
            Ok(result) => {
                self.result_area.set_inner_html(&html::render(&result, preview));
                dom::scroll_into_view_smooth(&self.result_area);
            }
            Err(e) => {
                console::error_1(&e.to_string().into());
                self.show_error(e.user_message());
            }
        }
    }

    fn show_error(&self, message: &str) {
        self.result_area.set_inner_html(&html::error_block(message));
        dom::scroll_into_view_smooth(&self.result_area);
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let page = Rc::new(Page::from_document(Config::same_origin())?);
    page.wire()
}

/// Render a backend response body to the result-block HTML.
#[wasm_bindgen(js_name = renderResult)]
pub fn render_result(body: &str, image_src: Option<String>) -> Result<String, JsValue> {
    let result = AnalysisResult::from_json(body).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(html::render(&result, image_src.as_deref()))
}

/// Probability as `"xx.x%"`.
#[wasm_bindgen(js_name = percentFormat)]
pub fn percent_format(p: f64) -> String {
    sentiview::percent_format(p)
}
