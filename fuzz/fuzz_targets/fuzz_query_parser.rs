#![no_main]

use bibq::catalog::FieldCatalog;
use bibq::profile::Profile;
use bibq::query::{compile, parse_cql, tokenize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Arbitrary query text must produce a value or an error, never a panic
    let _ = tokenize(data);
    if let Ok(query) = parse_cql(data) {
        if let Ok(compiled) = compile(&query, &FieldCatalog::default(), &Profile::unrestricted()) {
            let _ = compiled.render();
            let _ = compiled.render_sort();
        }
    }
});
