use std::collections::HashMap;

use regex_lite::{Captures, Regex};

use crate::models::{DeviceCategory, NamingTemplate, Settings};

/// Built-in fallback patterns when neither the plan nor the global settings
/// override a category.
pub const DEFAULT_SWITCH_TEMPLATE: &str = "{class}-{index:02d}";
pub const DEFAULT_SERVER_TEMPLATE: &str = "{class}-{index:03d}";

/// Resolves the name template for a device category: plan-scoped override
/// first, then the global default from settings, then the built-in pattern.
/// Names are a pure function of the plan, so regeneration reproduces them
/// byte for byte.
pub struct NameResolver {
    templates: HashMap<DeviceCategory, String>,
}

impl NameResolver {
    pub fn new(plan_templates: &[NamingTemplate], settings: &Settings) -> Self {
        let mut templates = HashMap::new();
        for t in &settings.naming_templates {
            templates.insert(t.category, t.template.clone());
        }
        // Plan-scoped overrides win over globals
        for t in plan_templates {
            templates.insert(t.category, t.template.clone());
        }
        Self { templates }
    }

    pub fn template_for(&self, category: DeviceCategory) -> &str {
        match self.templates.get(&category) {
            Some(template) => template.as_str(),
            None if category == DeviceCategory::Server => DEFAULT_SERVER_TEMPLATE,
            None => DEFAULT_SWITCH_TEMPLATE,
        }
    }

    pub fn render(&self, category: DeviceCategory, class_id: &str, index: i32) -> String {
        render_template(self.template_for(category), class_id, index)
    }
}

/// Substitute `{class}` and `{index}` placeholders; `{index:0Nd}` zero-pads
/// the instance number to N digits.
pub fn render_template(template: &str, class_id: &str, index: i32) -> String {
    let re = match Regex::new(r"\{(class|index)(?::0(\d+)d)?\}") {
        Ok(re) => re,
        Err(_) => {
            return template
                .replace("{class}", class_id)
                .replace("{index}", &index.to_string());
        }
    };

    re.replace_all(template, |caps: &Captures| match &caps[1] {
        "class" => class_id.to_string(),
        _ => {
            let width = caps
                .get(2)
                .and_then(|w| w.as_str().parse::<usize>().ok())
                .unwrap_or(0);
            format!("{:0width$}", index, width = width)
        }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_built_in_patterns() {
        assert_eq!(render_template(DEFAULT_SWITCH_TEMPLATE, "leaf", 3), "leaf-03");
        assert_eq!(
            render_template(DEFAULT_SERVER_TEMPLATE, "compute", 12),
            "compute-012"
        );
    }

    #[test]
    fn test_render_custom_widths_and_literals() {
        assert_eq!(render_template("{class}.{index:04d}.lab", "gpu", 7), "gpu.0007.lab");
        assert_eq!(render_template("{class}-{index}", "leaf", 10), "leaf-10");
        assert_eq!(render_template("static-name", "x", 1), "static-name");
    }

    #[test]
    fn test_resolver_precedence() {
        let settings = Settings {
            naming_templates: vec![NamingTemplate {
                category: DeviceCategory::Leaf,
                template: "global-{class}-{index}".to_string(),
            }],
        };
        let plan = vec![NamingTemplate {
            category: DeviceCategory::Spine,
            template: "plan-{class}-{index}".to_string(),
        }];
        let resolver = NameResolver::new(&plan, &settings);

        assert_eq!(resolver.render(DeviceCategory::Spine, "spine", 1), "plan-spine-1");
        assert_eq!(resolver.render(DeviceCategory::Leaf, "leaf", 2), "global-leaf-2");
        assert_eq!(resolver.render(DeviceCategory::Border, "border", 2), "border-02");
        assert_eq!(resolver.render(DeviceCategory::Server, "web", 2), "web-002");
    }

    #[test]
    fn test_plan_override_beats_global_for_same_category() {
        let settings = Settings {
            naming_templates: vec![NamingTemplate {
                category: DeviceCategory::Leaf,
                template: "global-{index}".to_string(),
            }],
        };
        let plan = vec![NamingTemplate {
            category: DeviceCategory::Leaf,
            template: "plan-{index}".to_string(),
        }];
        let resolver = NameResolver::new(&plan, &settings);
        assert_eq!(resolver.render(DeviceCategory::Leaf, "leaf", 9), "plan-9");
    }
}
