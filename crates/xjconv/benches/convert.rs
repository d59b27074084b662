use criterion::{black_box, criterion_group, criterion_main, Criterion};

use xjconv::{json_to_xml, validate, xml_to_json};

const CONTACT: &str = "<Contact><CustomerID>GREAL</CustomerID>\
<CompanyName>Great Lakes Food Market</CompanyName><ContactName>Howard Snyder</ContactName>\
<ContactTitle>Marketing Manager</ContactTitle><Address>2732 Baker Blvd.</Address>\
<City>Eugene</City><Email>howard@greatlakes.example</Email><Phone>(503) 555-7555</Phone>\
</Contact>";

fn address_book(contacts: usize) -> String {
    format!("<AddressBook>{}</AddressBook>", CONTACT.repeat(contacts))
}

fn bench_xml_to_json(c: &mut Criterion) {
    let xml = address_book(100);
    c.bench_function("convert_xml_json", |b| b.iter(|| xml_to_json(black_box(&xml))));
}

fn bench_json_to_xml(c: &mut Criterion) {
    let json = xml_to_json(&address_book(100)).unwrap_or_default();
    c.bench_function("convert_json_xml", |b| b.iter(|| json_to_xml(black_box(&json))));
}

fn bench_validate(c: &mut Criterion) {
    let xml = address_book(100);
    c.bench_function("validate_address_book", |b| b.iter(|| validate(black_box(&xml))));
}

criterion_group!(benches, bench_xml_to_json, bench_json_to_xml, bench_validate);
criterion_main!(benches);
