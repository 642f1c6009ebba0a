use console_error_panic_hook::set_once;
use wasm_bindgen::prelude::wasm_bindgen;

use crate::{context::CadenceContext, domain::Source};

#[wasm_bindgen]
pub fn evaluate(code: String) -> String {
    // Set the panic hook for better error messages in the browser console
    set_once();

    let mut context = CadenceContext::new(Source::from_text(&code));
    match context.run() {
        Ok(result) => format!("{}", result),
        Err(err) => format!("{}", err),
    }
}
