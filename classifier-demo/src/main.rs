use classifier_core::{ClassificationRule, Node, NodeGroup, Operator, RuleValue};
use classifier_engine::{validate_hierarchy, Classifier};
use serde_json::json;
use uuid::Uuid;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let redhat_base = Uuid::new_v4();
    let prod_web = Uuid::new_v4();
    let maintenance = Uuid::new_v4();

    let groups = vec![
        NodeGroup::new(redhat_base, "redhat-base")
            .with_rule(ClassificationRule::new(
                "os-family",
                "os.family",
                Operator::Eq,
                RuleValue::from("RedHat"),
            )?)
            .with_class("base")
            .with_variable("syslog_server", json!("logs.example.com")),
        NodeGroup::new(prod_web, "prod-web")
            .with_parent(redhat_base)
            .with_rule(ClassificationRule::new(
                "env",
                "environment",
                Operator::Eq,
                RuleValue::from("production"),
            )?)
            .with_class("nginx")
            .with_parameter("port", json!(80)),
        NodeGroup::new(maintenance, "maintenance")
            .with_pinned_node("db01.example.com")
            .with_class("maintenance_window"),
    ];

    let depths = validate_hierarchy(&groups)?;
    let classifier = Classifier::new(groups)?;

    let web01 = Node::new(
        "web01.example.com",
        json!({
            "os": {"family": "RedHat", "release": {"major": "9"}},
            "environment": "production",
            "processors": {"count": 8},
        }),
    );
    let db01 = Node::new(
        "db01.example.com",
        json!({"os": {"family": "Debian"}, "environment": "production"}),
    );

    let web = classifier.classify(&web01);
    let db = classifier.classify(&db01);

    println!(
        "groups={} max_depth={} web01_matched={} web01_classes={:?} web01_port={} web01_conflicts={} db01_matched={} db01_classes={:?}",
        classifier.group_count(),
        depths.values().max().copied().unwrap_or(0),
        web.matched_group_ids.len(),
        web.classes,
        web.parameters.get("port").cloned().unwrap_or(json!(null)),
        web.conflicts.len(),
        db.matched_group_ids.len(),
        db.classes,
    );
    Ok(())
}
