//! Namespace-scoped element access over a `roxmltree` document.
//!
//! Legacy project files declare
//! `xmlns="http://schemas.microsoft.com/developer/msbuild/2003"` on the root
//! `<Project>`; SDK-style files usually declare nothing. Every lookup goes
//! through a [`Scope`] built from the root element, so both cases share one
//! code path and elements from foreign namespaces are never picked up.

use roxmltree::Node;

use crate::text;

/// Element lookup bound to the root element's namespace (or none).
#[derive(Debug, Clone, Copy)]
pub struct Scope<'d> {
    namespace: Option<&'d str>,
}

impl<'d> Scope<'d> {
    /// Scope for the namespace declared by `root`.
    pub fn of(root: Node<'d, '_>) -> Self {
        Self { namespace: root.tag_name().namespace() }
    }

    /// The namespace this scope matches, if any.
    pub fn namespace(&self) -> Option<&'d str> {
        self.namespace
    }

    /// `node` is an element called `name` in this scope's namespace.
    pub fn is(&self, node: &Node, name: &str) -> bool {
        node.is_element()
            && node.tag_name().name() == name
            && node.tag_name().namespace() == self.namespace
    }

    /// `node` is an element in this scope's namespace.
    pub fn is_element(&self, node: &Node) -> bool {
        node.is_element() && node.tag_name().namespace() == self.namespace
    }

    /// Direct element children of `node` called `name`, in document order.
    pub fn children<'a, 'input>(
        self,
        node: Node<'a, 'input>,
        name: &str,
    ) -> impl Iterator<Item = Node<'a, 'input>> {
        node.children().filter(move |n| self.is(n, name))
    }

    /// First direct element child of `node` called `name`.
    pub fn child<'a, 'input>(&self, node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
        node.children().find(|n| self.is(n, name))
    }

    /// Trimmed, non-empty text of the first child element called `name`.
    pub fn child_text(&self, node: Node, name: &str) -> Option<String> {
        self.child(node, name).and_then(|c| element_text(&c))
    }

    /// Item metadata: the `name` attribute if present and non-empty,
    /// otherwise the child element of the same name.
    ///
    /// SDK-style projects write `<PackageReference Include="X" Version="1" />`,
    /// older tooling writes `<Version>1</Version>` as a child; both are
    /// accepted.
    pub fn metadata(&self, node: Node, name: &str) -> Option<String> {
        node.attribute(name)
            .and_then(text::non_empty)
            .or_else(|| self.child_text(node, name))
    }
}

/// Trimmed, non-empty text content of an element.
pub fn element_text(node: &Node) -> Option<String> {
    node.text().and_then(text::non_empty)
}

/// The `Condition` attribute of an element, when non-blank.
pub fn condition(node: &Node) -> Option<String> {
    node.attribute("Condition").and_then(text::non_empty)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const NAMESPACED: &str = r#"<Project xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <AssemblyName>  Legacy.App </AssemblyName>
  </PropertyGroup>
  <PropertyGroup xmlns="urn:other">
    <AssemblyName>Foreign</AssemblyName>
  </PropertyGroup>
</Project>"#;

    #[test]
    fn lookups_follow_root_namespace() {
        let doc = roxmltree::Document::parse(NAMESPACED).unwrap();
        let root = doc.root_element();
        let scope = Scope::of(root);
        assert_eq!(
            scope.namespace(),
            Some("http://schemas.microsoft.com/developer/msbuild/2003")
        );

        let groups: Vec<_> = scope.children(root, "PropertyGroup").collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(scope.child_text(groups[0], "AssemblyName").as_deref(), Some("Legacy.App"));
    }

    #[test]
    fn lookups_without_namespace() {
        let doc = roxmltree::Document::parse(
            r#"<Project Sdk="Microsoft.NET.Sdk"><ItemGroup><PackageReference Include="A"><Version>1.2</Version></PackageReference><PackageReference Include="B" Version="2.0" /></ItemGroup></Project>"#,
        )
        .unwrap();
        let root = doc.root_element();
        let scope = Scope::of(root);
        assert_eq!(scope.namespace(), None);

        let group = scope.child(root, "ItemGroup").unwrap();
        let versions: Vec<_> = scope
            .children(group, "PackageReference")
            .map(|r| scope.metadata(r, "Version"))
            .collect();
        assert_eq!(versions, vec![Some("1.2".to_string()), Some("2.0".to_string())]);
    }

    #[test]
    fn blank_condition_is_none() {
        let doc = roxmltree::Document::parse(r#"<PropertyGroup Condition="  " />"#).unwrap();
        assert_eq!(condition(&doc.root_element()), None);
    }
}
