//! Category catalog and finding classification
//!
//! Every finding type maps to exactly one of a fixed set of analysis
//! categories. Classification is total: types the table does not know
//! fall back to `code_quality`.

/// Fallback for finding types the table does not cover
pub const DEFAULT_CATEGORY: &str = "code_quality";

/// Static metadata for one analysis category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
    pub max_score: u32,
}

/// The fixed category catalog. Every scored run produces one
/// [`crate::CategoryScore`] per entry, issues or not.
pub const CATEGORY_CATALOG: [CategoryInfo; 9] = [
    CategoryInfo {
        id: "security",
        display_name: "Security Analysis",
        icon: "🔒",
        max_score: 100,
    },
    CategoryInfo {
        id: "code_quality",
        display_name: "Code Quality",
        icon: "🧪",
        max_score: 100,
    },
    CategoryInfo {
        id: "performance",
        display_name: "Performance",
        icon: "🚀",
        max_score: 100,
    },
    CategoryInfo {
        id: "compliance",
        display_name: "Compliance",
        icon: "⚖️",
        max_score: 100,
    },
    CategoryInfo {
        id: "accessibility",
        display_name: "Accessibility",
        icon: "♿",
        max_score: 100,
    },
    CategoryInfo {
        id: "mobile_crossplatform",
        display_name: "Mobile & Cross-Platform",
        icon: "📱",
        max_score: 100,
    },
    CategoryInfo {
        id: "documentation",
        display_name: "Documentation",
        icon: "📚",
        max_score: 100,
    },
    CategoryInfo {
        id: "testing",
        display_name: "Testing",
        icon: "🧪",
        max_score: 100,
    },
    CategoryInfo {
        id: "logging",
        display_name: "Logging",
        icon: "📝",
        max_score: 100,
    },
];

/// Look up catalog metadata by category id
pub fn category_info(id: &str) -> Option<&'static CategoryInfo> {
    CATEGORY_CATALOG.iter().find(|c| c.id == id)
}

/// Map a finding type to its category id. Total over all inputs.
pub fn classify(finding_type: &str) -> &'static str {
    match finding_type {
        // Security
        "input_validation_missing"
        | "sql_injection_risk"
        | "xss_vulnerability"
        | "csrf_vulnerability"
        | "insecure_data_storage"
        | "secret_exposure"
        | "https_missing" => "security",

        // Code quality
        "code_duplication"
        | "high_cyclomatic_complexity"
        | "solid_principle_violation"
        | "refactor_needed"
        | "typescript_type_error" => "code_quality",

        // Performance
        "performance_issue"
        | "memory_leak_risk"
        | "slow_database_query"
        | "caching_missing"
        | "performance_bottleneck" => "performance",

        // Compliance
        "gdpr_violation" | "compliance_issue" | "privacy_policy_missing" | "legal_risk" => {
            "compliance"
        }

        // Accessibility
        "accessibility_issue" | "contrast_issue" => "accessibility",

        // Mobile & cross-platform: React Native, PWA, responsive design,
        // touch handling, viewport meta, native layouts
        "missing_platform_check"
        | "missing_safe_area"
        | "hardcoded_dimensions"
        | "missing_keyboard_handling"
        | "missing_service_worker"
        | "missing_install_prompt"
        | "missing_pwa_manifest"
        | "missing_manifest_field"
        | "missing_icon_size"
        | "missing_pwa_dependencies"
        | "missing_responsive_hooks"
        | "desktop_first_approach"
        | "non_standard_breakpoints"
        | "excessive_px_units"
        | "not_mobile_first"
        | "heavy_library_import"
        | "missing_lazy_loading"
        | "missing_virtualization"
        | "missing_touch_feedback"
        | "missing_gesture_handling"
        | "small_touch_target"
        | "missing_orientation_handling"
        | "missing_viewport_meta"
        | "incorrect_viewport_width"
        | "missing_initial_scale"
        | "missing_apple_meta"
        | "missing_auto_layout"
        | "missing_accessibility_swift"
        | "non_responsive_android_layout"
        | "missing_content_description"
        | "non_responsive_flutter_widget"
        | "missing_flutter_semantics"
        | "missing_responsive_flutter"
        | "missing_mobile_testing"
        | "mobile_compatibility_issue" => "mobile_crossplatform",

        // Mobile accessibility
        "missing_mobile_a11y"
        | "missing_aria_labels"
        | "missing_semantic_html"
        | "missing_focus_management" => "mobile_crossplatform",

        // Network and connectivity
        "missing_offline_handling"
        | "missing_network_retry"
        | "missing_connection_check"
        | "missing_cache_strategy" => "mobile_crossplatform",

        // Battery and rendering
        "battery_drain_risk"
        | "excessive_animations"
        | "missing_request_animation_frame"
        | "background_processing_issue" => "mobile_crossplatform",

        // Mobile security
        "missing_csp_mobile"
        | "insecure_mobile_storage"
        | "missing_cert_pinning"
        | "missing_data_encryption" => "mobile_crossplatform",

        // Cross-platform state management
        "inconsistent_state_management"
        | "missing_state_abstraction"
        | "platform_specific_state" => "mobile_crossplatform",

        // Documentation
        "documentation_missing" | "api_documentation_missing" | "documentation_quality_issue" => {
            "documentation"
        }

        // Testing
        "test_missing" | "low_test_coverage" | "ci_pipeline_missing" => "testing",

        // Logging
        "insufficient_logging" | "pii_exposure_in_logs" | "wrong_log_level"
        | "monitoring_missing" => "logging",

        _ => DEFAULT_CATEGORY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_map_to_their_category() {
        assert_eq!(classify("sql_injection_risk"), "security");
        assert_eq!(classify("code_duplication"), "code_quality");
        assert_eq!(classify("memory_leak_risk"), "performance");
        assert_eq!(classify("gdpr_violation"), "compliance");
        assert_eq!(classify("contrast_issue"), "accessibility");
        assert_eq!(classify("missing_safe_area"), "mobile_crossplatform");
        assert_eq!(classify("api_documentation_missing"), "documentation");
        assert_eq!(classify("low_test_coverage"), "testing");
        assert_eq!(classify("pii_exposure_in_logs"), "logging");
    }

    #[test]
    fn unknown_types_fall_back_deterministically() {
        assert_eq!(classify("never_seen_before"), DEFAULT_CATEGORY);
        assert_eq!(classify(""), DEFAULT_CATEGORY);
        assert_eq!(classify("never_seen_before"), classify("never_seen_before"));
    }

    #[test]
    fn every_mapping_lands_in_the_catalog() {
        let samples = [
            "sql_injection_risk",
            "refactor_needed",
            "caching_missing",
            "legal_risk",
            "accessibility_issue",
            "missing_viewport_meta",
            "documentation_missing",
            "test_missing",
            "monitoring_missing",
            "totally_unknown",
        ];
        for sample in samples {
            assert!(category_info(classify(sample)).is_some(), "{sample}");
        }
    }

    #[test]
    fn catalog_is_complete() {
        assert_eq!(CATEGORY_CATALOG.len(), 9);
        assert!(category_info("security").is_some());
        assert!(category_info("unknown_category").is_none());
        for info in &CATEGORY_CATALOG {
            assert_eq!(info.max_score, 100);
            assert!(!info.display_name.is_empty());
        }
    }
}
