//! Static lookup tables: region display metadata and service categories.

use serde::Serialize;

/// Display metadata for a recognised region identifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionInfo {
    /// Region identifier, e.g. `"us-east-1"`.
    pub id: &'static str,
    /// Friendly location name.
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

const REGIONS: &[RegionInfo] = &[
    RegionInfo { id: "us-east-1", name: "N. Virginia", lat: 38.7469, lng: -77.4758 },
    RegionInfo { id: "us-east-2", name: "Ohio", lat: 40.4173, lng: -82.9071 },
    RegionInfo { id: "us-west-1", name: "N. California", lat: 37.3541, lng: -121.9552 },
    RegionInfo { id: "us-west-2", name: "Oregon", lat: 45.8491, lng: -119.7143 },
    RegionInfo { id: "eu-west-1", name: "Ireland", lat: 53.4129, lng: -8.2439 },
    RegionInfo { id: "eu-central-1", name: "Frankfurt", lat: 50.1109, lng: 8.6821 },
    RegionInfo { id: "ap-southeast-1", name: "Singapore", lat: 1.3521, lng: 103.8198 },
    RegionInfo { id: "ap-northeast-1", name: "Tokyo", lat: 35.6762, lng: 139.6503 },
    RegionInfo { id: "sa-east-1", name: "São Paulo", lat: -23.5505, lng: -46.6333 },
    RegionInfo { id: "ap-south-1", name: "Mumbai", lat: 19.0760, lng: 72.8777 },
    RegionInfo { id: "ap-southeast-2", name: "Sydney", lat: -33.8688, lng: 151.2093 },
    RegionInfo { id: "ca-central-1", name: "Canada", lat: 45.5017, lng: -73.5673 },
    RegionInfo { id: "eu-west-2", name: "London", lat: 51.5074, lng: -0.1278 },
    RegionInfo { id: "eu-west-3", name: "Paris", lat: 48.8566, lng: 2.3522 },
    RegionInfo { id: "eu-north-1", name: "Stockholm", lat: 59.3293, lng: 18.0686 },
    RegionInfo { id: "ap-northeast-2", name: "Seoul", lat: 37.5665, lng: 126.9780 },
];

/// Look up display metadata for `region`.
pub fn region_info(region: &str) -> Option<&'static RegionInfo> {
    REGIONS.iter().find(|r| r.id == region)
}

/// All recognised regions.
pub fn known_regions() -> &'static [RegionInfo] {
    REGIONS
}

/// A named, fixed set of service identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceCategory {
    pub name: &'static str,
    pub services: &'static [&'static str],
}

impl ServiceCategory {
    /// `true` when `service` belongs to this category.
    pub fn contains(&self, service: &str) -> bool {
        self.services.contains(&service)
    }
}

// Categories overlap on purpose (lambda is both compute and serverless).
const CATEGORIES: &[ServiceCategory] = &[
    ServiceCategory {
        name: "compute",
        services: &["ec2", "lambda", "ecs", "eks", "fargate", "batch", "lightsail"],
    },
    ServiceCategory {
        name: "storage",
        services: &["s3", "ebs", "efs", "fsx", "glacier", "storage-gateway"],
    },
    ServiceCategory {
        name: "database",
        services: &[
            "rds",
            "dynamodb",
            "elasticache",
            "redshift",
            "documentdb",
            "neptune",
            "timestream",
        ],
    },
    ServiceCategory {
        name: "networking",
        services: &[
            "vpc",
            "cloudfront",
            "route53",
            "elb",
            "direct-connect",
            "transit-gateway",
            "api-gateway",
        ],
    },
    ServiceCategory {
        name: "serverless",
        services: &[
            "lambda",
            "dynamodb",
            "api-gateway",
            "sqs",
            "sns",
            "eventbridge",
            "step-functions",
        ],
    },
    ServiceCategory {
        name: "security",
        services: &[
            "iam",
            "kms",
            "secrets-manager",
            "waf",
            "shield",
            "guardduty",
            "security-hub",
        ],
    },
    ServiceCategory {
        name: "analytics",
        services: &["athena", "emr", "kinesis", "glue", "quicksight", "opensearch"],
    },
    ServiceCategory {
        name: "ml",
        services: &[
            "sagemaker",
            "comprehend",
            "rekognition",
            "polly",
            "translate",
            "forecast",
        ],
    },
    ServiceCategory {
        name: "devops",
        services: &[
            "codecommit",
            "codebuild",
            "codedeploy",
            "codepipeline",
            "cloudformation",
            "systems-manager",
        ],
    },
];

/// All categories, in display order.
pub fn categories() -> &'static [ServiceCategory] {
    CATEGORIES
}

/// Look up a category by name (exact, case-sensitive).
pub fn category(name: &str) -> Option<&'static ServiceCategory> {
    CATEGORIES.iter().find(|c| c.name == name)
}

/// Category names, in display order.
pub fn category_names() -> Vec<&'static str> {
    CATEGORIES.iter().map(|c| c.name).collect()
}
