//! Builtin Taxonomy Tables

use super::{IocRule, IocRules, Taxonomy, TechniqueDefinition, ThreatActor};
use std::collections::BTreeMap;

pub const BUILTIN_VERSION: &str = "builtin-1";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Load the compiled-in taxonomy
pub fn builtin_taxonomy() -> Taxonomy {
    Taxonomy {
        version: BUILTIN_VERSION.to_string(),
        techniques: techniques(),
        ioc_rules: IocRules {
            file_hash: Some(IocRule {
                technique: "T1204".to_string(),
                confidence: 0.5,
            }),
            ip_address: Some(IocRule {
                technique: "T1071".to_string(),
                confidence: 0.6,
            }),
            url: Some(IocRule {
                technique: "T1566".to_string(),
                confidence: 0.6,
            }),
        },
        actors: actors(),
        industries: industries(),
        company_sizes: company_sizes(),
        regulated_industries: strings(&["financial", "healthcare", "government"]),
    }
}

fn techniques() -> Vec<TechniqueDefinition> {
    vec![
        // Initial Access
        TechniqueDefinition {
            id: "T1566".to_string(),
            name: "Phishing".to_string(),
            tactic: "Initial Access".to_string(),
            keywords: strings(&["phishing", "spearphishing", "malicious attachment", "malicious link", "credential harvesting"]),
        },
        TechniqueDefinition {
            id: "T1190".to_string(),
            name: "Exploit Public-Facing Application".to_string(),
            tactic: "Initial Access".to_string(),
            keywords: strings(&["remote code execution", "sql injection", "public-facing", "zero-day", "exploited vulnerability"]),
        },
        TechniqueDefinition {
            id: "T1133".to_string(),
            name: "External Remote Services".to_string(),
            tactic: "Initial Access".to_string(),
            keywords: strings(&["vpn appliance", "remote access gateway", "exposed rdp", "citrix"]),
        },
        TechniqueDefinition {
            id: "T1195".to_string(),
            name: "Supply Chain Compromise".to_string(),
            tactic: "Initial Access".to_string(),
            keywords: strings(&["supply chain", "compromised update", "trojanized installer", "third-party software"]),
        },
        TechniqueDefinition {
            id: "T1189".to_string(),
            name: "Drive-by Compromise".to_string(),
            tactic: "Initial Access".to_string(),
            keywords: strings(&["watering hole", "drive-by", "malvertising", "exploit kit"]),
        },
        // Execution
        TechniqueDefinition {
            id: "T1059".to_string(),
            name: "Command and Scripting Interpreter".to_string(),
            tactic: "Execution".to_string(),
            keywords: strings(&["powershell", "command line", "cmd.exe", "bash script", "scripting interpreter"]),
        },
        TechniqueDefinition {
            id: "T1204".to_string(),
            name: "User Execution".to_string(),
            tactic: "Execution".to_string(),
            keywords: strings(&["user execution", "malicious file", "enable macros", "opened the attachment"]),
        },
        // Persistence
        TechniqueDefinition {
            id: "T1053".to_string(),
            name: "Scheduled Task/Job".to_string(),
            tactic: "Persistence".to_string(),
            keywords: strings(&["scheduled task", "cron job", "schtasks"]),
        },
        TechniqueDefinition {
            id: "T1547".to_string(),
            name: "Boot or Logon Autostart Execution".to_string(),
            tactic: "Persistence".to_string(),
            keywords: strings(&["run key", "startup folder", "autostart", "logon script"]),
        },
        // Privilege Escalation
        TechniqueDefinition {
            id: "T1055".to_string(),
            name: "Process Injection".to_string(),
            tactic: "Privilege Escalation".to_string(),
            keywords: strings(&["process injection", "dll injection", "process hollowing", "code injection"]),
        },
        TechniqueDefinition {
            id: "T1068".to_string(),
            name: "Exploitation for Privilege Escalation".to_string(),
            tactic: "Privilege Escalation".to_string(),
            keywords: strings(&["privilege escalation", "elevation of privilege", "kernel exploit"]),
        },
        // Defense Evasion
        TechniqueDefinition {
            id: "T1027".to_string(),
            name: "Obfuscated Files or Information".to_string(),
            tactic: "Defense Evasion".to_string(),
            keywords: strings(&["obfuscated", "obfuscation", "packed payload", "encoded payload", "base64"]),
        },
        TechniqueDefinition {
            id: "T1562".to_string(),
            name: "Impair Defenses".to_string(),
            tactic: "Defense Evasion".to_string(),
            keywords: strings(&["disable antivirus", "bypass av", "edr evasion", "disable security tools", "tamper protection"]),
        },
        // Credential Access
        TechniqueDefinition {
            id: "T1003".to_string(),
            name: "OS Credential Dumping".to_string(),
            tactic: "Credential Access".to_string(),
            keywords: strings(&["credential dumping", "mimikatz", "lsass", "password hashes"]),
        },
        TechniqueDefinition {
            id: "T1110".to_string(),
            name: "Brute Force".to_string(),
            tactic: "Credential Access".to_string(),
            keywords: strings(&["brute force", "password spraying", "credential stuffing"]),
        },
        // Lateral Movement
        TechniqueDefinition {
            id: "T1021".to_string(),
            name: "Remote Services".to_string(),
            tactic: "Lateral Movement".to_string(),
            keywords: strings(&["lateral movement", "psexec", "remote desktop", "smb share"]),
        },
        // Command and Control
        TechniqueDefinition {
            id: "T1071".to_string(),
            name: "Application Layer Protocol".to_string(),
            tactic: "Command and Control".to_string(),
            keywords: strings(&["command and control", "c2 server", "c2 channel", "beaconing"]),
        },
        TechniqueDefinition {
            id: "T1105".to_string(),
            name: "Ingress Tool Transfer".to_string(),
            tactic: "Command and Control".to_string(),
            keywords: strings(&["dropper", "downloader", "second-stage payload", "tool transfer"]),
        },
        // Exfiltration
        TechniqueDefinition {
            id: "T1041".to_string(),
            name: "Exfiltration Over C2 Channel".to_string(),
            tactic: "Exfiltration".to_string(),
            keywords: strings(&["exfiltration", "exfiltrate", "data theft", "stolen data"]),
        },
        // Impact
        TechniqueDefinition {
            id: "T1486".to_string(),
            name: "Data Encrypted for Impact".to_string(),
            tactic: "Impact".to_string(),
            keywords: strings(&["ransomware", "encrypts files", "ransom note", "double extortion"]),
        },
        TechniqueDefinition {
            id: "T1490".to_string(),
            name: "Inhibit System Recovery".to_string(),
            tactic: "Impact".to_string(),
            keywords: strings(&["shadow copies", "vssadmin", "backup deletion"]),
        },
        TechniqueDefinition {
            id: "T1498".to_string(),
            name: "Network Denial of Service".to_string(),
            tactic: "Impact".to_string(),
            keywords: strings(&["ddos", "denial of service", "botnet flood"]),
        },
        TechniqueDefinition {
            id: "T1496".to_string(),
            name: "Resource Hijacking".to_string(),
            tactic: "Impact".to_string(),
            keywords: strings(&["cryptominer", "cryptojacking", "coin miner"]),
        },
    ]
}

fn actors() -> Vec<ThreatActor> {
    vec![
        ThreatActor {
            name: "APT28".to_string(),
            aliases: strings(&["Fancy Bear", "Sofacy", "Sednit", "STRONTIUM"]),
            confidence: 0.95,
            techniques: strings(&["T1566", "T1190", "T1003", "T1071"]),
        },
        ThreatActor {
            name: "APT29".to_string(),
            aliases: strings(&["Cozy Bear", "The Dukes", "NOBELIUM"]),
            confidence: 0.95,
            techniques: strings(&["T1195", "T1566", "T1027", "T1071"]),
        },
        ThreatActor {
            name: "Lazarus Group".to_string(),
            aliases: strings(&["Hidden Cobra", "Guardians of Peace", "ZINC"]),
            confidence: 0.90,
            techniques: strings(&["T1566", "T1204", "T1486", "T1041"]),
        },
        ThreatActor {
            name: "APT41".to_string(),
            aliases: strings(&["Winnti", "Barium", "Double Dragon"]),
            confidence: 0.85,
            techniques: strings(&["T1190", "T1195", "T1055", "T1496"]),
        },
        ThreatActor {
            name: "FIN7".to_string(),
            aliases: strings(&["Carbanak", "Carbon Spider"]),
            confidence: 0.85,
            techniques: strings(&["T1566", "T1059", "T1204"]),
        },
        ThreatActor {
            name: "Sandworm Team".to_string(),
            aliases: strings(&["Voodoo Bear", "Iridium", "Telebots"]),
            confidence: 0.90,
            techniques: strings(&["T1190", "T1486", "T1490", "T1498"]),
        },
        ThreatActor {
            name: "Wizard Spider".to_string(),
            aliases: strings(&["Grim Spider", "UNC1878"]),
            confidence: 0.80,
            techniques: strings(&["T1486", "T1490", "T1021", "T1003"]),
        },
    ]
}

fn industries() -> BTreeMap<String, Vec<String>> {
    let mut industries = BTreeMap::new();
    industries.insert(
        "financial".to_string(),
        strings(&["banking trojan", "payment fraud", "swift attack", "atm malware", "card skimming", "financial institution"]),
    );
    industries.insert(
        "healthcare".to_string(),
        strings(&["hospital", "patient data", "medical device", "health records", "healthcare"]),
    );
    industries.insert(
        "government".to_string(),
        strings(&["government", "election", "ministry", "public sector", "diplomatic"]),
    );
    industries.insert(
        "energy".to_string(),
        strings(&["power grid", "scada", "industrial control system", "pipeline", "utility"]),
    );
    industries.insert(
        "retail".to_string(),
        strings(&["point of sale", "pos malware", "e-commerce", "magecart", "card data"]),
    );
    industries.insert(
        "technology".to_string(),
        strings(&["saas", "cloud provider", "source code", "software vendor", "developer"]),
    );
    industries.insert(
        "manufacturing".to_string(),
        strings(&["manufacturing", "production line", "plc", "operational technology"]),
    );
    industries.insert(
        "education".to_string(),
        strings(&["university", "student data", "school district", "research institution"]),
    );
    industries
}

fn company_sizes() -> BTreeMap<String, Vec<String>> {
    let mut sizes = BTreeMap::new();
    sizes.insert(
        "small".to_string(),
        strings(&["small business", "small and medium", "startup"]),
    );
    sizes.insert(
        "medium".to_string(),
        strings(&["mid-size", "mid-market", "medium-sized"]),
    );
    sizes.insert(
        "large".to_string(),
        strings(&["enterprise", "fortune 500", "large organization", "multinational"]),
    );
    sizes.insert(
        "government".to_string(),
        strings(&["government agenc", "public sector", "state-sponsored", "municipal", "federal"]),
    );
    sizes
}
