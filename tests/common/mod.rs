#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Writes `content` to a uniquely named file with extension `ext`. The
    /// file is removed when the returned handle drops.
    pub fn create_temp_definition(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("paramgate_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_definition(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> NamedTempFile {
        create_temp_definition(content, "json")
    }
}

pub mod fixtures {
    use paramgate::definition::{build_dispatcher, ApiDefinition};
    use paramgate::dispatcher::Dispatcher;
    use paramgate::runtime_config::RuntimeConfig;

    /// Store API exercising nesting, versioning and relations.
    pub const STORE_API: &str = r#"
name: store
prefix: api
version:
  using: path
  versions: [v1, v2]
routes:
  - method: GET
    path: /orders
    handler: list_orders
    params:
      - { name: page, type: Integer, default: 1 }
      - { name: status, values: [open, closed] }
  - method: POST
    path: /orders
    handler: create_order
    params:
      - name: items
        required: true
        type: Array
        params:
          - { name: sku, required: true, regexp: '^[A-Z]{3}-\d+$' }
          - { name: quantity, required: true, type: Integer, values: { min: 1, max: 99 } }
      - { name: coupon }
      - { name: gift_card }
    relations:
      - { rule: mutually_exclusive, params: [coupon, gift_card] }
  - method: GET
    path: /orders/:id
    handler: show_order
    requirements: { id: '\d+' }
    params:
      - { name: id, required: true, type: Integer }
  - method: DELETE
    path: /orders/:id
    handler: cancel_order
"#;

    pub fn dispatcher_from(yaml: &str) -> Dispatcher {
        let definition: ApiDefinition = serde_yaml::from_str(yaml).unwrap();
        build_dispatcher(&definition, &RuntimeConfig::default()).unwrap()
    }

    pub fn store() -> Dispatcher {
        dispatcher_from(STORE_API)
    }
}
