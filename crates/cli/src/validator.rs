use anyhow::Result;
use backends::ProviderKind;
use sysinfo::System;

use crate::ui;

/// Minimum memory for comfortably running a local cluster, in GiB.
const MIN_MEMORY_GIB: u64 = 2;

/// Validates prerequisites before cluster operations.
pub struct PrerequisitesValidator {
    requirements: Vec<Requirement>,
}

struct Requirement {
    name: String,
    check: Box<dyn Fn() -> bool>,
    install_instructions: String,
    critical: bool,
}

fn binary_requirement(binary: &'static str, instructions: &str, critical: bool) -> Requirement {
    Requirement {
        name: binary.to_string(),
        check: Box::new(move || which::which(binary).is_ok()),
        install_instructions: instructions.to_string(),
        critical,
    }
}

impl PrerequisitesValidator {
    /// Requirements for operating clusters of the given provider.
    #[must_use]
    pub fn for_provider(provider: ProviderKind) -> Self {
        let mut requirements = Vec::new();

        requirements.push(binary_requirement(
            "kubectl",
            "Install kubectl from https://kubernetes.io/docs/tasks/tools/",
            true,
        ));

        match provider {
            ProviderKind::Minikube => {
                requirements.push(binary_requirement(
                    "minikube",
                    "Install minikube from https://minikube.sigs.k8s.io/docs/start/",
                    true,
                ));
            }
            ProviderKind::Kind => {
                requirements.push(binary_requirement(
                    "kind",
                    "Install kind from https://kind.sigs.k8s.io/docs/user/quick-start/#installation",
                    true,
                ));
                requirements.push(binary_requirement(
                    "docker",
                    "Install Docker from https://docker.com",
                    true,
                ));
            }
            ProviderKind::K3d => {
                requirements.push(binary_requirement(
                    "k3d",
                    "Install k3d from https://k3d.io/#installation",
                    true,
                ));
                requirements.push(binary_requirement(
                    "docker",
                    "Install Docker from https://docker.com",
                    true,
                ));
            }
        }

        requirements.push(Requirement {
            name: "System Memory".to_string(),
            check: Box::new(|| {
                let mut sys = System::new_all();
                sys.refresh_memory();
                let total_gib = sys.total_memory() / 1024 / 1024 / 1024;
                total_gib >= MIN_MEMORY_GIB
            }),
            install_instructions: format!(
                "At least {MIN_MEMORY_GIB}GB of RAM recommended for local clusters"
            ),
            critical: false,
        });

        Self { requirements }
    }

    pub fn validate(&self) -> Result<()> {
        println!();
        let mut failures = Vec::new();

        for requirement in &self.requirements {
            if (requirement.check)() {
                ui::print_check_result(&requirement.name, true, None);
            } else {
                ui::print_check_result(&requirement.name, false, None);
                failures.push(requirement);
            }
        }

        println!();

        if failures.is_empty() {
            ui::print_success("All prerequisites met!");
            return Ok(());
        }

        for failure in &failures {
            if failure.critical {
                ui::print_error(&format!(
                    "{} - {}",
                    failure.name, failure.install_instructions
                ));
            } else {
                ui::print_warning(&format!(
                    "{} - {}",
                    failure.name, failure.install_instructions
                ));
            }
        }
        println!();

        if failures.iter().any(|f| f.critical) {
            return Err(anyhow::anyhow!(
                "Critical prerequisites not met. Install the required tools and try again."
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_requirements_include_binary() {
        let v = PrerequisitesValidator::for_provider(ProviderKind::Kind);
        let names: Vec<_> = v.requirements.iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&"kind"));
        assert!(names.contains(&"docker"));
        assert!(names.contains(&"kubectl"));
    }

    #[test]
    fn test_minikube_does_not_require_docker() {
        let v = PrerequisitesValidator::for_provider(ProviderKind::Minikube);
        let names: Vec<_> = v.requirements.iter().map(|r| r.name.as_str()).collect();
        assert!(!names.contains(&"docker"));
        assert!(names.contains(&"minikube"));
    }

    #[test]
    fn test_memory_check_is_not_critical() {
        let v = PrerequisitesValidator::for_provider(ProviderKind::K3d);
        let memory = v
            .requirements
            .iter()
            .find(|r| r.name == "System Memory")
            .unwrap();
        assert!(!memory.critical);
    }
}
