//! Tests for qualified-name resolution.

use pretty_assertions::assert_eq;
use protolint::{parser, Binder, Resolver, SymbolTable};

const COMMON: &str = r#"
syntax = "proto3";
package acme;
message Money {}
message Order {
  message Money {}
}
"#;

const SHOP: &str = r#"
syntax = "proto3";
package acme.shop;
message Cart {
  Money total = 1;
  .acme.Money paid = 2;
  Order.Money refund = 3;
  map<string, Missing> unknown = 4;
  oneof o { acme.Order other = 5; }
}
service Checkout {
  rpc Pay (Cart) returns (.acme.Money);
}
"#;

fn bind_all() -> (SymbolTable, Vec<protolint::SourceFile>) {
    let mut files = vec![
        parser::parse("common.proto", COMMON).unwrap(),
        parser::parse("shop.proto", SHOP).unwrap(),
    ];
    let mut binder = Binder::new();
    for file in &mut files {
        binder.bind(file).unwrap();
    }
    (binder.into_symbols(), files)
}

#[test]
fn test_references_across_files() {
    let (table, files) = bind_all();
    let resolver = Resolver::new(&table);

    let resolved: Vec<(String, Option<String>)> = resolver
        .references(&files[1])
        .into_iter()
        .map(|r| (r.name.dotted(), r.symbol.map(|s| resolver.fully_qualified_name(s))))
        .collect();

    assert_eq!(
        resolved,
        vec![
            ("Money".to_string(), Some(".acme.Money".to_string())),
            (".acme.Money".to_string(), Some(".acme.Money".to_string())),
            ("Order.Money".to_string(), Some(".acme.Order.Money".to_string())),
            ("Missing".to_string(), None),
            ("acme.Order".to_string(), Some(".acme.Order".to_string())),
            ("Cart".to_string(), Some(".acme.shop.Cart".to_string())),
            (".acme.Money".to_string(), Some(".acme.Money".to_string())),
        ]
    );
}

#[test]
fn test_relative_depends_on_scope() {
    let (table, _) = bind_all();
    let resolver = Resolver::new(&table);
    let order = resolver.lookup_qualified(".acme.Order").unwrap();
    let cart = resolver.lookup_qualified(".acme.shop.Cart").unwrap();

    let from_order = resolver.resolve_path(order, &["Money"], false).unwrap();
    let from_cart = resolver.resolve_path(cart, &["Money"], false).unwrap();
    assert_eq!(resolver.fully_qualified_name(from_order), ".acme.Order.Money");
    assert_eq!(resolver.fully_qualified_name(from_cart), ".acme.Money");

    let abs_from_order = resolver.resolve_path(order, &["acme", "Money"], true);
    let abs_from_cart = resolver.resolve_path(cart, &["acme", "Money"], true);
    assert_eq!(abs_from_order, abs_from_cart);
}

#[test]
fn test_fully_qualified_name_is_canonical() {
    let (table, _) = bind_all();
    let resolver = Resolver::new(&table);
    for symbol in table.iter() {
        let name = resolver.fully_qualified_name(symbol.id);
        assert_eq!(resolver.lookup_qualified(&name), Some(symbol.id), "{}", name);
    }
    assert_eq!(resolver.fully_qualified_name(table.root()), ".");
}

#[test]
fn test_not_found_is_none() {
    let (table, _) = bind_all();
    let resolver = Resolver::new(&table);
    assert_eq!(resolver.lookup_qualified(".acme.Nope"), None);
    assert_eq!(resolver.lookup_qualified(".acme.Money.Inner"), None);
    assert_eq!(resolver.resolve_path(table.root(), &["shop", "Cart"], false), None);
}
