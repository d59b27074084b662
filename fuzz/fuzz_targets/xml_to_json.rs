#![no_main]
use libfuzzer_sys::fuzz_target;
use xjconv::{json_to_xml, validate, xml_to_json};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = validate(s);
        if let Ok(json) = xml_to_json(s) {
            let _ = json_to_xml(&json);
        }
    }
});
