use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ParseError;
use crate::model::{Dependency, Ecosystem};

use super::{dedup_dependencies, EcosystemParser, FileRole};

/// Parser for Maven `pom.xml` manifests.
///
/// Walks the project's `<dependencies>` section with a streaming reader;
/// `<dependencyManagement>` and plugin dependencies are not declared
/// dependencies and are ignored. The dependency name is
/// `groupId:artifactId`, matching the advisory feed's package naming.
/// Entries without a literal version (property interpolation, versions
/// managed by a parent POM) cannot be matched and are skipped.
pub struct MavenParser;

impl EcosystemParser for MavenParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn parse(&self, content: &str, _role: FileRole) -> Result<Vec<Dependency>, ParseError> {
        let mut reader = Reader::from_str(content);

        let mut deps = Vec::new();
        // Open-element path while outside a <dependency>. Entries are
        // collected only from <project><dependencies>, so managed and
        // plugin dependencies are not reported as declared.
        let mut path: Vec<String> = Vec::new();
        let mut in_dependency = false;
        // Depth below <dependency>; coordinates are captured only at depth 1
        // so <exclusions> children cannot clobber them.
        let mut depth = 0usize;
        let mut current_tag: Option<String> = None;
        let mut group_id: Option<String> = None;
        let mut artifact_id: Option<String> = None;
        let mut version: Option<String> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if in_dependency {
                        depth += 1;
                        current_tag = (depth == 1).then_some(name);
                    } else if name == "dependency" && path == ["project", "dependencies"] {
                        in_dependency = true;
                        depth = 0;
                        group_id = None;
                        artifact_id = None;
                        version = None;
                        current_tag = None;
                    } else {
                        path.push(name);
                    }
                }
                Event::End(_) => {
                    if in_dependency {
                        // Depth zero means this closes the <dependency>
                        // itself; the reader rejects mismatched end tags.
                        if depth == 0 {
                            if let Some(dep) = finish_dependency(&group_id, &artifact_id, &version)
                            {
                                deps.push((dep, true));
                            }
                            in_dependency = false;
                        } else {
                            depth -= 1;
                        }
                    } else {
                        path.pop();
                    }
                    current_tag = None;
                }
                Event::Text(t) => {
                    if in_dependency {
                        if let Some(tag) = current_tag.as_deref() {
                            let text = t.unescape().unwrap_or_default().trim().to_string();
                            match tag {
                                "groupId" => group_id = Some(text),
                                "artifactId" => artifact_id = Some(text),
                                "version" => version = Some(text),
                                _ => {}
                            }
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(dedup_dependencies(deps))
    }
}

fn finish_dependency(
    group_id: &Option<String>,
    artifact_id: &Option<String>,
    version: &Option<String>,
) -> Option<Dependency> {
    let (group, artifact, version) = (group_id.as_ref()?, artifact_id.as_ref()?, version.as_ref()?);
    // ${project.version} and friends cannot be resolved from one file.
    if version.contains("${") || version.is_empty() {
        return None;
    }
    Some(Dependency::new(
        format!("{group}:{artifact}"),
        version,
        Ecosystem::Maven,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dependency_entries() {
        let content = r#"<?xml version="1.0"?>
<project>
  <groupId>com.example</groupId>
  <artifactId>demo</artifactId>
  <dependencies>
    <dependency>
      <groupId>org.apache.logging.log4j</groupId>
      <artifactId>log4j-core</artifactId>
      <version>2.14.1</version>
    </dependency>
    <dependency>
      <groupId>com.google.guava</groupId>
      <artifactId>guava</artifactId>
      <version>31.0-jre</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>"#;
        let deps = MavenParser.parse(content, FileRole::Manifest).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(
            deps[0],
            Dependency::new(
                "org.apache.logging.log4j:log4j-core",
                "2.14.1",
                Ecosystem::Maven
            )
        );
    }

    #[test]
    fn skips_interpolated_and_managed_versions() {
        let content = r#"<project>
  <dependencies>
    <dependency>
      <groupId>com.example</groupId>
      <artifactId>from-property</artifactId>
      <version>${dep.version}</version>
    </dependency>
    <dependency>
      <groupId>com.example</groupId>
      <artifactId>managed</artifactId>
    </dependency>
  </dependencies>
</project>"#;
        let deps = MavenParser.parse(content, FileRole::Manifest).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn exclusions_do_not_clobber_coordinates() {
        let content = r#"<project><dependencies>
    <dependency>
      <groupId>com.example</groupId>
      <artifactId>widget</artifactId>
      <version>1.1.0</version>
      <exclusions>
        <exclusion>
          <groupId>org.excluded</groupId>
          <artifactId>noise</artifactId>
        </exclusion>
      </exclusions>
    </dependency>
</dependencies></project>"#;
        let deps = MavenParser.parse(content, FileRole::Manifest).unwrap();
        assert_eq!(
            deps,
            vec![Dependency::new("com.example:widget", "1.1.0", Ecosystem::Maven)]
        );
    }

    #[test]
    fn managed_and_plugin_dependencies_are_not_declared() {
        let content = r#"<project>
  <dependencyManagement>
    <dependencies>
      <dependency><groupId>g</groupId><artifactId>managed</artifactId><version>1.0</version></dependency>
    </dependencies>
  </dependencyManagement>
  <build>
    <plugins>
      <plugin>
        <dependencies>
          <dependency><groupId>g</groupId><artifactId>plugin-dep</artifactId><version>2.0</version></dependency>
        </dependencies>
      </plugin>
    </plugins>
  </build>
  <dependencies>
    <dependency><groupId>g</groupId><artifactId>real</artifactId><version>3.0</version></dependency>
  </dependencies>
</project>"#;
        let deps = MavenParser.parse(content, FileRole::Manifest).unwrap();
        assert_eq!(deps, vec![Dependency::new("g:real", "3.0", Ecosystem::Maven)]);
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let content = "<project><dependencies><dependency></project>";
        let err = MavenParser.parse(content, FileRole::Manifest).unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)));
    }

    #[test]
    fn duplicate_coordinates_deduplicate() {
        let content = r#"<project><dependencies>
    <dependency><groupId>g</groupId><artifactId>a</artifactId><version>1.0</version></dependency>
    <dependency><groupId>g</groupId><artifactId>a</artifactId><version>2.0</version></dependency>
</dependencies></project>"#;
        let deps = MavenParser.parse(content, FileRole::Manifest).unwrap();
        assert_eq!(deps, vec![Dependency::new("g:a", "1.0", Ecosystem::Maven)]);
    }
}
