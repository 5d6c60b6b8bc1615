#[cfg(feature = "serde")]
mod serde_tests {
    use crate::{FileProcessor, TransformPolicy};

    #[test]
    fn policies_serialize_as_tagged_objects() {
        let relocate = TransformPolicy::relocate("/backup").unwrap();
        assert_eq!(
            serde_json::to_value(&relocate).unwrap(),
            serde_json::json!({"kind": "relocate", "value": "/backup"})
        );
        let rewrite = TransformPolicy::extension_rewrite("zip").unwrap();
        assert_eq!(
            serde_json::to_string(&rewrite).unwrap(),
            r#"{"kind":"extension_rewrite","value":".zip"}"#
        );
    }

    #[test]
    fn deserialization_goes_through_the_validated_constructors() {
        let policy: TransformPolicy =
            serde_json::from_str(r#"{"kind":"extension_rewrite","value":"mp3"}"#).unwrap();
        assert_eq!(policy, TransformPolicy::ExtensionRewrite(".mp3".into()));

        let relocate: TransformPolicy =
            serde_json::from_str(r#"{"kind":"relocate","value":"/backup//daily/"}"#).unwrap();
        assert_eq!(relocate.apply("/srv/a.txt"), "/backup/daily/a.txt");

        let rotate: TransformPolicy =
            serde_json::from_str(r#"{"kind":"timestamp_rotate","value":"2025-01-04"}"#).unwrap();
        assert_eq!(rotate.apply("app.log"), "app_2025-01-04.log");
    }

    #[test]
    fn invalid_policy_arguments_fail_to_deserialize() {
        for json in [
            r#"{"kind":"extension_rewrite","value":"../x"}"#,
            r#"{"kind":"timestamp_rotate","value":"2025/01/04"}"#,
            r#"{"kind":"timestamp_rotate","value":""}"#,
            r#"{"kind":"relocate","value":""}"#,
            r#"{"kind":"shred","value":"/"}"#,
        ] {
            assert!(
                serde_json::from_str::<TransformPolicy>(json).is_err(),
                "{json} should be rejected"
            );
        }
    }
}
