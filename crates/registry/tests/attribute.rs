//! `#[template]` declarations resolved through the process-wide registry.

// Expansion must not trip lints on the annotated code.
#![deny(unused)]

use std::fmt::Display;
use std::task::{Context, Poll, Waker};

use inscribe_registry::{LookupRequest, ScanUnit, TemplateRecord, function_name, request, template};
use pretty_assertions::assert_eq;

#[template("Hello, {0}!")]
fn greet(name: &str) -> String {
	request!().format(&[&name]).unwrap()
}

#[template("could not open {0}")]
#[template("permission denied for {0}", id = "denied")]
#[template("{0} does not exist", id = "missing")]
fn open_error(path: &str, kind: &str) -> String {
	request!(kind).format(&[&path]).unwrap()
}

#[template("only one")]
fn single(identifier: &str) -> Option<&'static str> {
	request!(identifier).resolve_template()
}

fn undeclared() -> Option<&'static str> {
	request!().resolve_template()
}

struct Door {
	name: &'static str,
}

impl Door {
	#[template("the {0} door is locked")]
	fn locked(&self) -> String {
		request!().format(&[&self.name]).unwrap()
	}
}

#[template("closure says {0}")]
fn from_closure() -> String {
	let render = |word: &str| request!().format(&[&word]).unwrap();
	render("hi")
}

#[template("one line {0}")]
fn one_line(n: u32) -> String { request!().format(&[&n]).unwrap() }

#[template("fetched {0}")]
async fn fetch(name: &str) -> String {
	request!().format(&[&name]).unwrap()
}

#[template("described as {0}")]
fn describe<T: Display>(value: T) -> String {
	request!().format(&[&value]).unwrap()
}

trait Speak {
	fn speak(&self) -> String;
}

impl Speak for Door {
	#[template("the {0} door creaks")]
	fn speak(&self) -> String { request!().format(&[&self.name]).unwrap() }
}

#[template("answer is {0}")]
const fn answer() -> u32 {
	42
}

const ANSWER: u32 = answer();

/// Polls a future that never suspends.
fn ready<F: Future>(future: F) -> F::Output {
	let mut future = std::pin::pin!(future);
	let mut cx = Context::from_waker(Waker::noop());
	loop {
		if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
			return output;
		}
	}
}

#[template("site marker")]
fn site_path() -> &'static str {
	function_name!()
}

fn ensure_initialized() {
	inscribe_registry::initialize(Some(&ScanUnit::linked())).unwrap();
	assert!(inscribe_registry::is_initialized());
}

#[test]
fn formats_free_function_template() {
	ensure_initialized();
	assert_eq!(greet("World"), "Hello, World!");
}

#[test]
fn identifiers_select_between_templates() {
	ensure_initialized();
	assert_eq!(open_error("a.txt", ""), "could not open a.txt");
	assert_eq!(open_error("a.txt", "denied"), "permission denied for a.txt");
	assert_eq!(open_error("a.txt", "missing"), "a.txt does not exist");
	assert_eq!(open_error("a.txt", "unknown"), "");
}

#[test]
fn single_template_ignores_identifier() {
	ensure_initialized();
	assert_eq!(single(""), Some("only one"));
	assert_eq!(single("anything"), Some("only one"));
}

#[test]
fn functions_without_templates_resolve_nothing() {
	ensure_initialized();
	assert_eq!(undeclared(), None);
}

#[test]
fn methods_and_closures_resolve_their_function() {
	ensure_initialized();
	assert_eq!(Door { name: "front" }.locked(), "the front door is locked");
	assert_eq!(from_closure(), "closure says hi");
}

#[test]
fn declarations_keep_order_and_lines() {
	let table = ScanUnit::linked().only_modules(["attribute"]).build().unwrap();
	let module = site_path().rsplit_once("::").map_or("", |(module, _)| module);
	assert!(table.candidates(file!(), module).is_empty());

	let records = table.candidates(file!(), &format!("{module}::open_error"));
	let identifiers: Vec<&str> = records.iter().map(TemplateRecord::identifier).collect();
	assert_eq!(identifiers, vec!["", "denied", "missing"]);

	let lines: Vec<u32> = records.iter().map(TemplateRecord::line).collect();
	assert_eq!(lines[1], lines[0] + 1);
	assert_eq!(lines[2], lines[1] + 1);
}

#[test]
fn attribute_and_request_agree_on_the_function_path() {
	let table = ScanUnit::linked().only_modules(["attribute"]).build().unwrap();
	let path = site_path();
	assert!(path.ends_with("::site_path"), "{path}");
	assert_eq!(table.candidates(file!(), path).len(), 1);

	let request = LookupRequest::new(file!(), path, 1);
	assert_eq!(request.resolve_template(), Some("site marker"));
}

#[test]
fn one_line_bodies_resolve() {
	ensure_initialized();
	assert_eq!(one_line(3), "one line 3");
}

#[test]
fn async_fn_resolves_its_template() {
	ensure_initialized();
	assert_eq!(ready(fetch("mail")), "fetched mail");
}

#[test]
fn generic_fn_resolves_for_every_instantiation() {
	ensure_initialized();
	assert_eq!(describe(7), "described as 7");
	assert_eq!(describe("text"), "described as text");
}

#[test]
fn trait_impl_method_resolves_its_template() {
	ensure_initialized();
	assert_eq!(Door { name: "back" }.speak(), "the back door creaks");
}

#[test]
fn const_fn_registers_its_template() {
	assert_eq!(ANSWER, 42);
	let function = concat!(module_path!(), "::answer");
	let request = LookupRequest::new(file!(), function, line!());
	assert_eq!(request.format(&[&answer()]).unwrap(), "answer is 42");
}

#[test]
fn module_filter_keeps_trait_impl_methods() {
	let all = ScanUnit::linked().build().unwrap();
	let filtered = ScanUnit::linked().only_modules(["attribute"]).build().unwrap();

	assert_eq!(filtered.len(), all.len());
	assert!(filtered.iter().any(|(_, function, records)| function.starts_with('<') && !records.is_empty()));
}
