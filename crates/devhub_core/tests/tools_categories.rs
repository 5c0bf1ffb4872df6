use devhub_core::model::tool::Tool;
use devhub_core::repo::category_registry::DEFAULT_CATEGORIES;
use devhub_core::service::tool_service::{
    NewTool, ToolFilter, ToolService, ToolServiceError, ALL_CATEGORIES, DEFAULT_TOOL_DESCRIPTION,
    TOOL_COLORS,
};
use devhub_core::{CategoryRegistry, EntityCollection, MemoryStorage, PersistentStore};
use std::sync::Arc;

fn open_service(storage: &Arc<MemoryStorage>) -> ToolService {
    let store: Arc<dyn PersistentStore> = Arc::new(storage.open_context());
    let defaults = DEFAULT_CATEGORIES.iter().map(|name| name.to_string()).collect();
    ToolService::new(
        EntityCollection::open(Arc::clone(&store), "devhub_tools"),
        CategoryRegistry::open(store, "devhub_categories", defaults),
    )
}

fn add(service: &ToolService, title: &str, category: &str) -> Tool {
    service
        .add_tool(NewTool {
            title: title.to_string(),
            url: format!("{}.dev", title.to_lowercase()),
            description: String::new(),
            category: Some(category.to_string()),
        })
        .unwrap()
}

#[test]
fn deleting_category_reassigns_its_tools_to_other() {
    let storage = MemoryStorage::new();
    let service = open_service(&storage);
    service.add_category("Research").unwrap();
    let first = add(&service, "Arxiv", "Research");
    let second = add(&service, "Scholar", "Research");
    let unrelated = add(&service, "Figma", "Design");

    let reassigned = service.delete_category("Research").unwrap();

    assert_eq!(reassigned, 2);
    let tools = service.collection();
    assert_eq!(tools.get(&first.id).unwrap().category.as_deref(), Some("Other"));
    assert_eq!(tools.get(&second.id).unwrap().category.as_deref(), Some("Other"));
    assert_eq!(tools.get(&unrelated.id).unwrap(), unrelated);
    assert!(!service.categories().contains("Research"));

    // Survives a reload from another context.
    let reopened = open_service(&storage);
    assert!(!reopened.categories().contains("Research"));
    assert_eq!(
        reopened.collection().get(&first.id).unwrap().category.as_deref(),
        Some("Other")
    );
}

#[test]
fn add_tool_normalizes_input() {
    let storage = MemoryStorage::new();
    let service = open_service(&storage);

    let tool = service
        .add_tool(NewTool {
            title: "  GitHub ".to_string(),
            url: " github.com ".to_string(),
            description: "   ".to_string(),
            category: None,
        })
        .unwrap();

    assert_eq!(tool.title, "GitHub");
    assert_eq!(tool.url, "https://github.com");
    assert_eq!(tool.description.as_deref(), Some(DEFAULT_TOOL_DESCRIPTION));
    assert_eq!(tool.category.as_deref(), Some("Development"));
    assert!(TOOL_COLORS.contains(&tool.color.as_str()));
}

#[test]
fn add_tool_validates_title_url_and_category() {
    let storage = MemoryStorage::new();
    let service = open_service(&storage);
    let input = NewTool {
        title: "Docs".to_string(),
        url: "docs.rs".to_string(),
        description: String::new(),
        category: None,
    };

    assert!(matches!(
        service.add_tool(NewTool {
            title: " ".to_string(),
            ..input.clone()
        }),
        Err(ToolServiceError::InvalidTitle)
    ));
    assert!(matches!(
        service.add_tool(NewTool {
            url: String::new(),
            ..input.clone()
        }),
        Err(ToolServiceError::InvalidUrl)
    ));
    assert!(matches!(
        service.add_tool(NewTool {
            category: Some("Gaming".to_string()),
            ..input.clone()
        }),
        Err(ToolServiceError::UnknownCategory(name)) if name == "Gaming"
    ));
    assert!(service.collection().is_empty());
}

#[test]
fn fallback_category_stays_assignable_after_removal() {
    let storage = MemoryStorage::new();
    let service = open_service(&storage);
    service.delete_category("Other").unwrap();

    let tool = add(&service, "Misc", "Other");
    assert_eq!(tool.category.as_deref(), Some("Other"));
}

#[test]
fn category_add_trims_and_ignores_duplicates() {
    let storage = MemoryStorage::new();
    let service = open_service(&storage);

    assert!(service.add_category("  Research ").unwrap());
    assert!(!service.add_category("Research").unwrap());
    assert!(!service.add_category("   ").unwrap());

    let tabs = service.category_tabs();
    assert_eq!(tabs.first().map(String::as_str), Some(ALL_CATEGORIES));
    assert_eq!(tabs.last().map(String::as_str), Some("Research"));
    assert_eq!(tabs.len(), DEFAULT_CATEGORIES.len() + 2);
}

#[test]
fn malformed_categories_fall_back_to_defaults() {
    let storage = MemoryStorage::new();
    storage.seed("devhub_categories", "not json").unwrap();
    let service = open_service(&storage);
    assert_eq!(service.categories().names(), DEFAULT_CATEGORIES.to_vec());
}

#[test]
fn filter_combines_search_and_category() {
    let storage = MemoryStorage::new();
    let service = open_service(&storage);
    let figma = add(&service, "Figma", "Design");
    add(&service, "Framer", "Development");
    add(&service, "Notion", "Productivity");

    let design_only = service.filter(&ToolFilter {
        search: String::new(),
        category: "Design".to_string(),
    });
    assert_eq!(design_only, vec![figma.clone()]);

    let by_url = service.filter(&ToolFilter {
        search: "FIGMA.DEV".to_string(),
        category: ALL_CATEGORIES.to_string(),
    });
    assert_eq!(by_url, vec![figma]);

    let by_prefix = service.filter(&ToolFilter {
        search: "f".to_string(),
        ..ToolFilter::default()
    });
    assert_eq!(by_prefix.len(), 2);
}

#[test]
fn deleting_the_selected_category_resets_the_tab_to_all() {
    let storage = MemoryStorage::new();
    let service = open_service(&storage);
    service.add_category("Research").unwrap();
    let arxiv = add(&service, "Arxiv", "Research");
    let mut filter = ToolFilter {
        search: String::new(),
        category: "Research".to_string(),
    };
    assert_eq!(service.filter(&filter), vec![arxiv.clone()]);

    service.delete_category("Research").unwrap();
    assert!(filter.forget_category("Research"));

    assert_eq!(filter, ToolFilter::default());
    assert_eq!(service.filter(&filter).len(), 1);
    assert!(!service.category_tabs().contains(&"Research".to_string()));
}

#[test]
fn deleting_another_category_keeps_the_selected_tab() {
    let mut filter = ToolFilter {
        search: "fig".to_string(),
        category: "Design".to_string(),
    };

    assert!(!filter.forget_category("Research"));
    assert_eq!(filter.category, "Design");

    let mut all = ToolFilter::default();
    assert!(!all.forget_category(ALL_CATEGORIES));
    assert_eq!(all, ToolFilter::default());
}
